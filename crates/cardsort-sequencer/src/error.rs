//! Fault taxonomy for the sort sequencer.
//!
//! Timeouts are *expected operational faults* (card missing, jammed, or a
//! sensor malfunction); the sequencer guarantees every actuator is
//! released before surfacing them, and never retries on its own — retry
//! policy belongs to the caller. `Cancelled` is operator-initiated and not
//! an error in the mechanism. `AlreadyRunning` is caller misuse, rejected
//! before any hardware side effect.

use crate::phase::SequencePhase;
use cardsort_gpio::GpioError;
use std::time::Duration;

/// Result type alias for sequencer operations.
pub type SequencerResult<T> = std::result::Result<T, SequencerFault>;

/// Faults surfaced by [`route_card`](crate::SortSequencer::route_card).
#[derive(Debug, thiserror::Error)]
pub enum SequencerFault {
    /// No card reached the light barrier: nothing was fed, or the feeder
    /// stalled.
    #[error("No card reached the sensor within {elapsed:?}")]
    ArrivalTimeout { elapsed: Duration },

    /// The card never cleared the light barrier: jam in front of the
    /// sensor.
    #[error("Card did not clear the sensor within {elapsed:?}")]
    TransitTimeout { elapsed: Duration },

    /// No cycle boundary appeared after the card cleared.
    #[error("No gap or following card within {elapsed:?} after clearance")]
    GapTimeout { elapsed: Duration },

    /// The external stop signal fired mid-sequence.
    #[error("Sequence cancelled during {phase}")]
    Cancelled { phase: SequencePhase },

    /// A routing sequence is already in flight.
    #[error("A routing sequence is already running")]
    AlreadyRunning,

    /// The pin layer failed.
    #[error("GPIO failure: {0}")]
    Gpio(#[from] GpioError),

    /// Internal phase-tracking error.
    #[error("Phase error: {0}")]
    Phase(#[from] cardsort_core::Error),
}

impl SequencerFault {
    /// Returns `true` for the sensor-timeout family of faults.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ArrivalTimeout { .. } | Self::TransitTimeout { .. } | Self::GapTimeout { .. }
        )
    }

    /// Returns `true` if the fault was operator-initiated cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_classification() {
        let elapsed = Duration::from_secs(5);
        assert!(SequencerFault::ArrivalTimeout { elapsed }.is_timeout());
        assert!(SequencerFault::TransitTimeout { elapsed }.is_timeout());
        assert!(SequencerFault::GapTimeout { elapsed }.is_timeout());
        assert!(!SequencerFault::AlreadyRunning.is_timeout());
        assert!(
            !SequencerFault::Cancelled {
                phase: SequencePhase::Dwell
            }
            .is_timeout()
        );
    }

    #[test]
    fn test_cancelled_display_names_phase() {
        let fault = SequencerFault::Cancelled {
            phase: SequencePhase::Dwell,
        };
        assert!(fault.is_cancelled());
        assert_eq!(fault.to_string(), "Sequence cancelled during Dwell");
    }

    #[test]
    fn test_gpio_fault_conversion() {
        let fault: SequencerFault = GpioError::not_configured(24u8).into();
        assert!(matches!(fault, SequencerFault::Gpio(_)));
    }
}
