use cardsort_core::SortDirection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Card attribute a sorting rule tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAttribute {
    /// Converted mana cost (numeric).
    Cmc,

    /// Market price (numeric).
    Price,

    /// Color identity string, e.g. "WU".
    ColorIdentity,

    /// Type line, e.g. "Legendary Creature".
    TypeLine,
}

impl RuleAttribute {
    /// Stable string code used in the database.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleAttribute::Cmc => "cmc",
            RuleAttribute::Price => "price",
            RuleAttribute::ColorIdentity => "color_identity",
            RuleAttribute::TypeLine => "type_line",
        }
    }

    /// Parse a string code.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "cmc" => Some(RuleAttribute::Cmc),
            "price" => Some(RuleAttribute::Price),
            "color_identity" => Some(RuleAttribute::ColorIdentity),
            "type_line" => Some(RuleAttribute::TypeLine),
            _ => None,
        }
    }

    /// Whether this attribute is compared numerically.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, RuleAttribute::Cmc | RuleAttribute::Price)
    }
}

impl fmt::Display for RuleAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Comparison operator of a sorting rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOperator {
    /// Strictly greater than (numeric).
    Gt,

    /// Greater than or equal (numeric).
    Ge,

    /// Strictly less than (numeric).
    Lt,

    /// Less than or equal (numeric).
    Le,

    /// Equal (numeric or string).
    Eq,

    /// Substring containment (string).
    Contains,
}

impl RuleOperator {
    /// Stable string code used in the database.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleOperator::Gt => ">",
            RuleOperator::Ge => ">=",
            RuleOperator::Lt => "<",
            RuleOperator::Le => "<=",
            RuleOperator::Eq => "=",
            RuleOperator::Contains => "contains",
        }
    }

    /// Parse a string code.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            ">" => Some(RuleOperator::Gt),
            ">=" => Some(RuleOperator::Ge),
            "<" => Some(RuleOperator::Lt),
            "<=" => Some(RuleOperator::Le),
            "=" => Some(RuleOperator::Eq),
            "contains" => Some(RuleOperator::Contains),
            _ => None,
        }
    }

    /// Whether this operator only applies to numeric attributes.
    #[must_use]
    pub fn is_numeric_only(&self) -> bool {
        !matches!(self, RuleOperator::Eq | RuleOperator::Contains)
    }
}

impl fmt::Display for RuleOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User-defined sorting rule.
///
/// Rules are evaluated in insertion order; the first rule whose comparison
/// matches decides the card's direction. The attribute and operator are
/// stored as their string codes (the schema CHECK constraints restrict
/// them to the codes above); the typed accessors parse on demand.
///
/// # Examples
///
/// ```
/// use cardsort_core::SortDirection;
/// use cardsort_storage::models::{RuleAttribute, RuleOperator, SortingRule};
///
/// let rule = SortingRule::new(
///     "High CMC Cards",
///     RuleAttribute::Cmc,
///     RuleOperator::Gt,
///     "3",
///     SortDirection::Left,
/// );
/// assert_eq!(rule.attribute(), Some(RuleAttribute::Cmc));
/// assert_eq!(rule.operator(), Some(RuleOperator::Gt));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SortingRule {
    /// Auto-increment primary key (0 before insertion).
    pub id: i64,

    /// Human-readable rule name.
    pub name: String,

    /// Attribute code, see [`RuleAttribute`].
    pub attribute: String,

    /// Operator code, see [`RuleOperator`].
    pub operator: String,

    /// Comparison value; parsed per attribute type at evaluation time.
    pub value: String,

    /// Direction for matching cards ("left"/"right").
    pub sort_direction: String,

    /// When the rule was created.
    pub created_at: DateTime<Utc>,
}

impl SortingRule {
    /// Create a new rule.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        attribute: RuleAttribute,
        operator: RuleOperator,
        value: impl Into<String>,
        direction: SortDirection,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            attribute: attribute.as_str().to_string(),
            operator: operator.as_str().to_string(),
            value: value.into(),
            sort_direction: direction.as_str().to_string(),
            created_at: Utc::now(),
        }
    }

    /// Typed attribute, if the stored code is valid.
    #[must_use]
    pub fn attribute(&self) -> Option<RuleAttribute> {
        RuleAttribute::parse(&self.attribute)
    }

    /// Typed operator, if the stored code is valid.
    #[must_use]
    pub fn operator(&self) -> Option<RuleOperator> {
        RuleOperator::parse(&self.operator)
    }

    /// Typed direction, if the stored code is valid.
    #[must_use]
    pub fn direction(&self) -> Option<SortDirection> {
        self.sort_direction.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cmc", Some(RuleAttribute::Cmc))]
    #[case("price", Some(RuleAttribute::Price))]
    #[case("color_identity", Some(RuleAttribute::ColorIdentity))]
    #[case("type_line", Some(RuleAttribute::TypeLine))]
    #[case("rarity", None)]
    fn test_attribute_codec(#[case] code: &str, #[case] expected: Option<RuleAttribute>) {
        assert_eq!(RuleAttribute::parse(code), expected);
        if let Some(attr) = expected {
            assert_eq!(attr.as_str(), code);
        }
    }

    #[rstest]
    #[case(">", Some(RuleOperator::Gt))]
    #[case(">=", Some(RuleOperator::Ge))]
    #[case("<", Some(RuleOperator::Lt))]
    #[case("<=", Some(RuleOperator::Le))]
    #[case("=", Some(RuleOperator::Eq))]
    #[case("contains", Some(RuleOperator::Contains))]
    #[case("!=", None)]
    fn test_operator_codec(#[case] code: &str, #[case] expected: Option<RuleOperator>) {
        assert_eq!(RuleOperator::parse(code), expected);
    }

    #[test]
    fn test_rule_round_trips_typed_fields() {
        let rule = SortingRule::new(
            "Expensive Cards",
            RuleAttribute::Price,
            RuleOperator::Ge,
            "20.0",
            SortDirection::Right,
        );

        assert_eq!(rule.attribute(), Some(RuleAttribute::Price));
        assert_eq!(rule.operator(), Some(RuleOperator::Ge));
        assert_eq!(rule.direction(), Some(SortDirection::Right));
        assert_eq!(rule.value, "20.0");
    }

    #[test]
    fn test_numeric_classification() {
        assert!(RuleAttribute::Cmc.is_numeric());
        assert!(RuleAttribute::Price.is_numeric());
        assert!(!RuleAttribute::ColorIdentity.is_numeric());
        assert!(RuleOperator::Gt.is_numeric_only());
        assert!(!RuleOperator::Contains.is_numeric_only());
    }
}
