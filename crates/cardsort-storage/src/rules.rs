//! Sorting-rule evaluation.
//!
//! Maps a scanned card's attributes to a physical sort direction. The
//! policy, in order:
//!
//! 1. A card the recognizer could not identify always goes left — the
//!    left tray is the "needs human attention" tray.
//! 2. Rules are tried in insertion order; the first rule whose comparison
//!    matches decides the direction.
//! 3. A recognized card matching no rule goes right.
//!
//! A rule whose operator does not fit its attribute (e.g. `contains` on
//! `cmc`) or whose value does not parse is skipped with a warning rather
//! than failing the card.

use crate::models::{RuleAttribute, RuleOperator, SortingRule};
use cardsort_core::SortDirection;

/// Evaluable view of one scanned card.
///
/// Decoupled from the storage model so the pipeline can evaluate rules
/// before the record is persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardProfile {
    /// Corrected card name; `None` for unrecognized scans.
    pub name: Option<String>,

    /// Converted mana cost.
    pub cmc: Option<f64>,

    /// Market price.
    pub price: Option<f64>,

    /// Color identity string, e.g. "WU".
    pub color_identity: Option<String>,

    /// Type line.
    pub type_line: Option<String>,
}

impl CardProfile {
    /// Profile of a card the recognizer could not identify.
    #[must_use]
    pub fn unrecognized() -> Self {
        Self::default()
    }

    /// Profile of a recognized card with no metadata.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    fn numeric(&self, attribute: RuleAttribute) -> Option<f64> {
        match attribute {
            RuleAttribute::Cmc => self.cmc,
            RuleAttribute::Price => self.price,
            _ => None,
        }
    }

    fn text(&self, attribute: RuleAttribute) -> Option<&str> {
        match attribute {
            RuleAttribute::ColorIdentity => self.color_identity.as_deref(),
            RuleAttribute::TypeLine => self.type_line.as_deref(),
            _ => None,
        }
    }
}

/// Decide the sort direction for a card.
#[must_use]
pub fn evaluate_rules(rules: &[SortingRule], profile: &CardProfile) -> SortDirection {
    if profile.name.is_none() {
        return SortDirection::Left;
    }

    for rule in rules {
        if rule_matches(rule, profile) {
            let direction = rule.direction().unwrap_or(SortDirection::Left);
            tracing::debug!(rule = %rule.name, %direction, "sorting rule matched");
            return direction;
        }
    }

    SortDirection::Right
}

fn rule_matches(rule: &SortingRule, profile: &CardProfile) -> bool {
    let (Some(attribute), Some(operator)) = (rule.attribute(), rule.operator()) else {
        tracing::warn!(rule = %rule.name, "rule has unknown attribute or operator, skipping");
        return false;
    };

    if attribute.is_numeric() {
        let Ok(threshold) = rule.value.parse::<f64>() else {
            tracing::warn!(rule = %rule.name, value = %rule.value,
                "non-numeric value for numeric attribute, skipping");
            return false;
        };
        let Some(actual) = profile.numeric(attribute) else {
            return false;
        };
        match operator {
            RuleOperator::Gt => actual > threshold,
            RuleOperator::Ge => actual >= threshold,
            RuleOperator::Lt => actual < threshold,
            RuleOperator::Le => actual <= threshold,
            RuleOperator::Eq => (actual - threshold).abs() < f64::EPSILON,
            RuleOperator::Contains => {
                tracing::warn!(rule = %rule.name, "'contains' on numeric attribute, skipping");
                false
            }
        }
    } else {
        let Some(actual) = profile.text(attribute) else {
            return false;
        };
        match operator {
            RuleOperator::Eq => actual == rule.value,
            RuleOperator::Contains => actual.contains(&rule.value),
            _ => {
                tracing::warn!(rule = %rule.name, operator = %operator,
                    "ordering operator on text attribute, skipping");
                false
            }
        }
    }
}
