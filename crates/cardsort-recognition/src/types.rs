//! Types crossing the recognition boundary.

use crate::error::{RecognitionError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Result of one identification pass over a scanned card.
///
/// `raw_text` is whatever the OCR step extracted from the title area;
/// `corrected` is the dictionary-matched card name, or `None` when no
/// candidate scored well enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedName {
    /// Raw OCR text before correction.
    pub raw_text: String,

    /// Best-guess corrected card name, if any.
    pub corrected: Option<String>,
}

impl ScannedName {
    /// A successfully corrected scan.
    #[must_use]
    pub fn recognized(raw_text: impl Into<String>, corrected: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            corrected: Some(corrected.into()),
        }
    }

    /// A scan the correction step could not match.
    #[must_use]
    pub fn unrecognized(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            corrected: None,
        }
    }

    /// Whether the correction step produced a name.
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        self.corrected.is_some()
    }
}

/// Card metadata returned by the external lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardMetadata {
    /// Market price in the lookup's currency.
    pub price: Option<f64>,

    /// Color identity string, e.g. "WU".
    pub color_identity: Option<String>,

    /// Converted mana cost.
    pub cmc: Option<f64>,

    /// Type line, e.g. "Legendary Creature".
    pub type_line: Option<String>,

    /// Card image URI.
    pub image_uri: Option<String>,
}

/// Rectangle of the camera frame the OCR step reads the card title from.
///
/// Produced by the one-time interactive calibration tool and persisted as
/// JSON; the sorter loads it at startup and hands it to the OCR
/// collaborator unchanged.
///
/// # Examples
///
/// ```
/// use cardsort_recognition::CropRegion;
///
/// let region = CropRegion::new(120, 80, 640, 120).unwrap();
/// assert_eq!(region.right(), 760);
/// assert_eq!(region.bottom(), 200);
///
/// // Zero-sized regions are rejected.
/// assert!(CropRegion::new(0, 0, 0, 100).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    /// Left edge in pixels.
    pub x: u32,

    /// Top edge in pixels.
    pub y: u32,

    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,
}

impl CropRegion {
    /// Create a crop region with validation.
    ///
    /// # Errors
    /// Returns `InvalidCropRegion` if the width or height is zero.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RecognitionError::invalid_crop_region(format!(
                "Width and height must be non-zero, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Right edge in pixels.
    #[must_use]
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge in pixels.
    #[must_use]
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Load a crop region from a JSON file.
    ///
    /// # Errors
    /// Returns I/O errors, JSON errors, or `InvalidCropRegion` for a file
    /// describing a zero-sized rectangle.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let region: CropRegion = serde_json::from_str(&contents)?;
        // Re-validate: the file may have been edited by hand.
        Self::new(region.x, region.y, region.width, region.height)
    }

    /// Persist the crop region as a JSON file.
    ///
    /// # Errors
    /// Returns I/O errors from the write.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
