//! Error types for the recognition boundary.

/// Result type alias for recognition operations.
pub type Result<T> = std::result::Result<T, RecognitionError>;

/// Errors that can occur at the recognition boundary.
#[derive(Debug, thiserror::Error)]
pub enum RecognitionError {
    /// The identifier's input source is gone (camera feed ended, mock
    /// handle dropped).
    #[error("Identifier disconnected: {source_name}")]
    Disconnected { source_name: String },

    /// A capture or OCR pass failed.
    #[error("Capture failed: {message}")]
    CaptureFailed { message: String },

    /// The metadata lookup failed (network or decode error).
    #[error("Metadata lookup failed: {message}")]
    LookupFailed { message: String },

    /// Crop region is geometrically invalid.
    #[error("Invalid crop region: {message}")]
    InvalidCropRegion { message: String },

    /// Crop-region file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Crop-region file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RecognitionError {
    /// Create a new disconnected error.
    pub fn disconnected(source_name: impl Into<String>) -> Self {
        Self::Disconnected {
            source_name: source_name.into(),
        }
    }

    /// Create a new capture-failed error.
    pub fn capture_failed(message: impl Into<String>) -> Self {
        Self::CaptureFailed {
            message: message.into(),
        }
    }

    /// Create a new lookup-failed error.
    pub fn lookup_failed(message: impl Into<String>) -> Self {
        Self::LookupFailed {
            message: message.into(),
        }
    }

    /// Create a new invalid-crop-region error.
    pub fn invalid_crop_region(message: impl Into<String>) -> Self {
        Self::InvalidCropRegion {
            message: message.into(),
        }
    }
}
