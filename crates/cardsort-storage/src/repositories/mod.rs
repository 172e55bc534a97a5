//! Repository traits and SQLite implementations.
//!
//! All data access goes through repository traits, keeping the pipeline
//! testable against in-memory databases and separating business logic
//! from persistence. The traits use native async methods (Edition 2024
//! RPITIT); no `async_trait` macro is needed.

pub mod scanned_card;
pub mod sorting_rule;

pub use scanned_card::{ScannedCardRepository, SqliteScannedCardRepository};
pub use sorting_rule::{SortingRuleRepository, SqliteSortingRuleRepository};
