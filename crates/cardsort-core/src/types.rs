use crate::{Result, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical routing outcome chosen for a card before the sequencer runs.
///
/// Produced by the rule-evaluation layer (a card the recognizer could not
/// identify is always routed left by policy of that layer, never by the
/// sequencer itself) and consumed exactly once per card by the sort
/// sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Route the card to the left output tray.
    Left,

    /// Route the card to the right output tray.
    Right,
}

impl SortDirection {
    /// Stable string code used in the database and on the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Left => "left",
            SortDirection::Right => "right",
        }
    }

    /// The opposite direction.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Left => SortDirection::Right,
            SortDirection::Right => SortDirection::Left,
        }
    }

    /// Returns `true` for [`SortDirection::Left`].
    #[inline]
    #[must_use]
    pub fn is_left(self) -> bool {
        matches!(self, SortDirection::Left)
    }

    /// Returns `true` for [`SortDirection::Right`].
    #[inline]
    #[must_use]
    pub fn is_right(self) -> bool {
        matches!(self, SortDirection::Right)
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SortDirection {
    type Err = Error;

    /// Parse the string codes `"left"` and `"right"` (case-insensitive).
    ///
    /// # Errors
    /// Returns `Error::InvalidDirection` for any other input.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(SortDirection::Left),
            "right" => Ok(SortDirection::Right),
            other => Err(Error::InvalidDirection(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("left", SortDirection::Left)]
    #[case("right", SortDirection::Right)]
    #[case("LEFT", SortDirection::Left)]
    #[case("  Right ", SortDirection::Right)]
    fn test_direction_parse_valid(#[case] input: &str, #[case] expected: SortDirection) {
        let direction: SortDirection = input.parse().unwrap();
        assert_eq!(direction, expected);
    }

    #[rstest]
    #[case("up")]
    #[case("")]
    #[case("lefty")]
    fn test_direction_parse_invalid(#[case] input: &str) {
        let result: Result<SortDirection> = input.parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_direction_flipped() {
        assert_eq!(SortDirection::Left.flipped(), SortDirection::Right);
        assert_eq!(SortDirection::Right.flipped(), SortDirection::Left);
    }

    #[test]
    fn test_direction_display_matches_code() {
        assert_eq!(SortDirection::Left.to_string(), "left");
        assert_eq!(SortDirection::Right.to_string(), "right");
    }

    #[test]
    fn test_direction_serialization() {
        let serialized = serde_json::to_string(&SortDirection::Left).unwrap();
        assert_eq!(serialized, "\"left\"");

        let deserialized: SortDirection = serde_json::from_str("\"right\"").unwrap();
        assert_eq!(deserialized, SortDirection::Right);
    }
}
