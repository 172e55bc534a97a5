//! Pipeline error type.

use cardsort_recognition::RecognitionError;
use cardsort_sequencer::SequencerFault;
use cardsort_storage::StorageError;

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Failures of one pipeline step, tagged by stage.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Identification or metadata lookup failed.
    #[error("Recognition error: {0}")]
    Recognition(#[from] RecognitionError),

    /// The physical routing faulted; the card was not stored.
    #[error("Sequencer fault: {0}")]
    Sequencer(#[from] SequencerFault),

    /// Reading rules or storing the record failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl PipelineError {
    /// Whether this failure came from the physical actuation path.
    #[must_use]
    pub fn is_sequencer_fault(&self) -> bool {
        matches!(self, Self::Sequencer(_))
    }

    /// Whether the operator cancelled the run.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Sequencer(fault) if fault.is_cancelled())
    }
}
