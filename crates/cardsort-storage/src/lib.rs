//! Storage layer for the card sorter.
//!
//! This crate provides SQLite-backed persistence for scanned cards and
//! user-defined sorting rules, plus the rule-evaluation function that maps
//! a card's attributes to a physical sort direction.
//!
//! # Architecture
//!
//! The storage layer uses a repository pattern with the following
//! components:
//!
//! - [`Database`] - Connection pool manager with automatic migrations
//! - [`ScannedCardRepository`], [`SortingRuleRepository`] - Data access
//!   traits with SQLite implementations
//! - [`evaluate_rules`] - insertion-ordered first-match rule evaluation
//! - [`export::write_csv`] - CSV export of the scan log
//!
//! # Examples
//!
//! ```no_run
//! use cardsort_core::SortDirection;
//! use cardsort_storage::{
//!     CardProfile, Database, DatabaseConfig, ScannedCardRepository,
//!     SortingRuleRepository, SqliteScannedCardRepository,
//!     SqliteSortingRuleRepository, evaluate_rules,
//! };
//! use cardsort_storage::models::{RuleAttribute, RuleOperator, ScannedCard, SortingRule};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DatabaseConfig::new("cardsort.db")).await?;
//!
//! let rules = SqliteSortingRuleRepository::new(db.pool().clone());
//! rules
//!     .add(&SortingRule::new(
//!         "High CMC Cards",
//!         RuleAttribute::Cmc,
//!         RuleOperator::Gt,
//!         "3",
//!         SortDirection::Left,
//!     ))
//!     .await?;
//!
//! let profile = CardProfile {
//!     name: Some("Craw Wurm".to_string()),
//!     cmc: Some(6.0),
//!     ..CardProfile::default()
//! };
//! let direction = evaluate_rules(&rules.list().await?, &profile);
//! assert_eq!(direction, SortDirection::Left);
//!
//! let cards = SqliteScannedCardRepository::new(db.pool().clone());
//! let id = cards
//!     .add(&ScannedCard::new(profile.name.clone(), direction).with_cmc(6.0))
//!     .await?;
//! println!("stored card {}", id);
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod export;
pub mod models;
pub mod repositories;
pub mod rules;

pub use connection::{Database, DatabaseConfig};
pub use error::{StorageError, StorageResult};
pub use models::{CardFilter, RuleAttribute, RuleOperator, ScannedCard, SortingRule};
pub use repositories::{
    ScannedCardRepository, SortingRuleRepository, SqliteScannedCardRepository,
    SqliteSortingRuleRepository,
};
pub use rules::{CardProfile, evaluate_rules};
