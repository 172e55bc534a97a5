//! Data models for the card-sorter storage layer.

pub mod scanned_card;
pub mod sorting_rule;

pub use scanned_card::{CardFilter, ScannedCard};
pub use sorting_rule::{RuleAttribute, RuleOperator, SortingRule};
