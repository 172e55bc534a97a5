//! Recognition-boundary interfaces for the card sorter.
//!
//! Image acquisition, OCR, fuzzy name correction, and the card-metadata
//! web lookup are external collaborators of the sorting machine. This
//! crate defines the traits the pipeline consumes — [`CardIdentifier`]
//! producing a corrected name per scanned card and [`MetadataProvider`]
//! resolving a name to price/color/type metadata — together with mock
//! implementations for development and testing without a camera or
//! network.
//!
//! It also carries [`CropRegion`], the output of the one-time interactive
//! crop calibration tool: the rectangle of the camera frame the OCR step
//! reads the card title from, persisted as JSON between runs.

pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

pub use error::{RecognitionError, Result};
pub use mock::{MockIdentifier, MockIdentifierHandle, MockMetadataProvider, MockMetadataHandle};
pub use traits::{CardIdentifier, MetadataProvider};
pub use types::{CardMetadata, CropRegion, ScannedName};
