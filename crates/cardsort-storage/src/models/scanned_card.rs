use cardsort_core::SortDirection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One card that passed through the sorter.
///
/// `name` is the corrected card name from the recognition step; it is
/// `None` when the OCR text could not be matched to any known card. Such
/// rows still carry `ocr_name_raw` for later inspection. The metadata
/// columns (`price`, `cmc`, `color_identity`, `type_line`, `image_uri`)
/// come from the external lookup and are absent when the lookup found
/// nothing or was skipped.
///
/// # Examples
///
/// ```
/// use cardsort_core::SortDirection;
/// use cardsort_storage::models::ScannedCard;
///
/// let card = ScannedCard::new(Some("Sol Ring".to_string()), SortDirection::Right)
///     .with_price(1.50)
///     .with_color_identity("C");
///
/// assert!(card.is_recognized());
/// assert_eq!(card.direction(), SortDirection::Right);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScannedCard {
    /// Auto-increment primary key (0 before insertion).
    pub id: i64,

    /// Corrected card name; `None` for unrecognized scans.
    pub name: Option<String>,

    /// Raw OCR text before correction.
    pub ocr_name_raw: Option<String>,

    /// Market price in the lookup's currency.
    pub price: Option<f64>,

    /// Converted mana cost.
    pub cmc: Option<f64>,

    /// Color identity string, e.g. "WU".
    pub color_identity: Option<String>,

    /// Type line, e.g. "Instant".
    pub type_line: Option<String>,

    /// Card image URI from the lookup.
    pub image_uri: Option<String>,

    /// Direction the card was physically routed ("left"/"right").
    pub sorted_direction: String,

    /// When the card was scanned.
    pub scanned_at: DateTime<Utc>,
}

impl ScannedCard {
    /// Create a record for a freshly scanned card.
    #[must_use]
    pub fn new(name: Option<String>, direction: SortDirection) -> Self {
        Self {
            id: 0,
            name,
            ocr_name_raw: None,
            price: None,
            cmc: None,
            color_identity: None,
            type_line: None,
            image_uri: None,
            sorted_direction: direction.as_str().to_string(),
            scanned_at: Utc::now(),
        }
    }

    /// Set the raw OCR text.
    #[must_use]
    pub fn with_ocr_raw(mut self, raw: impl Into<String>) -> Self {
        self.ocr_name_raw = Some(raw.into());
        self
    }

    /// Set the market price.
    #[must_use]
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Set the converted mana cost.
    #[must_use]
    pub fn with_cmc(mut self, cmc: f64) -> Self {
        self.cmc = Some(cmc);
        self
    }

    /// Set the color identity.
    #[must_use]
    pub fn with_color_identity(mut self, colors: impl Into<String>) -> Self {
        self.color_identity = Some(colors.into());
        self
    }

    /// Set the type line.
    #[must_use]
    pub fn with_type_line(mut self, type_line: impl Into<String>) -> Self {
        self.type_line = Some(type_line.into());
        self
    }

    /// Set the image URI.
    #[must_use]
    pub fn with_image_uri(mut self, uri: impl Into<String>) -> Self {
        self.image_uri = Some(uri.into());
        self
    }

    /// Whether the recognition step identified this card.
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        self.name.is_some()
    }

    /// The direction this card was routed.
    ///
    /// Falls back to [`SortDirection::Left`] if the stored string is not a
    /// valid direction code; the schema CHECK constraint makes that
    /// unreachable for rows written by this crate.
    #[must_use]
    pub fn direction(&self) -> SortDirection {
        self.sorted_direction
            .parse()
            .unwrap_or(SortDirection::Left)
    }
}

/// Filter for querying scanned cards.
///
/// All fields are conjunctive; `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardFilter {
    /// Cards whose color identity contains this string (e.g. "U").
    pub color: Option<String>,

    /// Cards priced at or above this value.
    pub min_price: Option<f64>,

    /// Cards with converted mana cost at or below this value.
    pub max_cmc: Option<f64>,
}

impl CardFilter {
    /// A filter that matches every card.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to cards containing the given color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Restrict to cards priced at or above the given value.
    #[must_use]
    pub fn with_min_price(mut self, price: f64) -> Self {
        self.min_price = Some(price);
        self
    }

    /// Restrict to cards with cmc at or below the given value.
    #[must_use]
    pub fn with_max_cmc(mut self, cmc: f64) -> Self {
        self.max_cmc = Some(cmc);
        self
    }

    /// Whether this filter constrains anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_card_carries_direction_code() {
        let card = ScannedCard::new(Some("Island".to_string()), SortDirection::Left);
        assert_eq!(card.sorted_direction, "left");
        assert_eq!(card.direction(), SortDirection::Left);
        assert!(card.is_recognized());
    }

    #[test]
    fn test_unrecognized_card() {
        let card = ScannedCard::new(None, SortDirection::Left).with_ocr_raw("S0l R1ng");
        assert!(!card.is_recognized());
        assert_eq!(card.ocr_name_raw.as_deref(), Some("S0l R1ng"));
    }

    #[test]
    fn test_builder_sets_metadata() {
        let card = ScannedCard::new(Some("Lightning Bolt".to_string()), SortDirection::Right)
            .with_price(0.5)
            .with_cmc(1.0)
            .with_color_identity("R")
            .with_type_line("Instant");

        assert_eq!(card.price, Some(0.5));
        assert_eq!(card.cmc, Some(1.0));
        assert_eq!(card.color_identity.as_deref(), Some("R"));
        assert_eq!(card.type_line.as_deref(), Some("Instant"));
    }

    #[test]
    fn test_filter_is_empty() {
        assert!(CardFilter::all().is_empty());
        assert!(!CardFilter::all().with_color("U").is_empty());
    }
}
