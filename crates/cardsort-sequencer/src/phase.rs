//! Sequence phase tracking.
//!
//! This module provides the state machine backing one run of the card-sort
//! sequence, from conveyor start through sensor-synchronized routing to
//! conveyor cooldown.
//!
//! # Phases
//!
//! - `Idle`: no sequence running; all actuators released
//! - `Conveying`: conveyor energized, card moving toward the barrier
//! - `AwaitingCard`: waiting for the card's leading edge
//! - `Routing`: direction-specific actuators engaging
//! - `AwaitingClear`: waiting for the card's trailing edge
//! - `AwaitingGap`: waiting for the cycle boundary (gap or next card)
//! - `Dwell`: holding routing actuators for their fixed dwell
//! - `Releasing`: de-energizing routing actuators
//! - `ConveyorCooldown`: conveyor settle time before release
//!
//! # Valid Transitions
//!
//! The happy path walks the phases in the order above and returns to
//! `Idle`. `Dwell` and `Releasing` may interleave, because the left and
//! right timing tables order their holds and releases differently. Every
//! active phase may abort directly to `Idle` (fault or cancellation).
//!
//! # Examples
//!
//! ```
//! use cardsort_sequencer::{PhaseTracker, SequencePhase};
//!
//! let mut tracker = PhaseTracker::new();
//! assert_eq!(tracker.current(), SequencePhase::Idle);
//!
//! tracker.advance(SequencePhase::Conveying).unwrap();
//! assert_eq!(tracker.current(), SequencePhase::Conveying);
//!
//! // Skipping ahead is rejected.
//! assert!(tracker.advance(SequencePhase::Dwell).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use cardsort_core::{Error, Result};

/// Maximum number of phase transitions to keep in the tracker history.
///
/// One full routing cycle produces at most eleven transitions, so this
/// retains several complete cycles for diagnostics without growing
/// unbounded on a long sorting session.
const MAX_HISTORY_SIZE: usize = 64;

/// Phase of the card-sort actuation sequence.
///
/// Created `Idle` at startup; driven only by sensor reads and elapsed-time
/// checks inside one run of the sequence; returns to `Idle` on completion,
/// fault, or cancellation. Nothing here persists across process restarts —
/// physical pin state is the only durable state, and it is forced to
/// released levels at every startup and shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencePhase {
    /// No sequence running.
    Idle,

    /// Conveyor energized, card moving toward the light barrier.
    Conveying,

    /// Waiting for the card's leading edge at the barrier.
    AwaitingCard,

    /// Direction-specific actuators engaging.
    Routing,

    /// Waiting for the card's trailing edge.
    AwaitingClear,

    /// Waiting for the cycle boundary (gap or next card).
    AwaitingGap,

    /// Holding routing actuators for a fixed dwell.
    Dwell,

    /// De-energizing routing actuators.
    Releasing,

    /// Conveyor settle time before release.
    ConveyorCooldown,
}

impl SequencePhase {
    /// Returns `true` for every phase except `Idle`.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, SequencePhase::Idle)
    }

    /// Check if transition to the target phase is valid from this phase.
    ///
    /// # Examples
    ///
    /// ```
    /// use cardsort_sequencer::SequencePhase;
    ///
    /// assert!(SequencePhase::Idle.can_transition_to(&SequencePhase::Conveying));
    /// assert!(!SequencePhase::Idle.can_transition_to(&SequencePhase::Dwell));
    /// // Any active phase may abort to Idle.
    /// assert!(SequencePhase::AwaitingCard.can_transition_to(&SequencePhase::Idle));
    /// ```
    #[must_use]
    pub fn can_transition_to(&self, target: &SequencePhase) -> bool {
        use SequencePhase::*;

        // Abort path: every active phase may return to Idle.
        if *target == Idle {
            return self.is_active();
        }

        matches!(
            (self, target),
            (Idle, Conveying)
                | (Conveying, AwaitingCard)
                | (AwaitingCard, Routing)
                | (Routing, AwaitingClear)
                | (AwaitingClear, AwaitingGap)
                // The timing tables order holds and releases per direction,
                // so Dwell and Releasing interleave.
                | (AwaitingGap, Dwell | Releasing)
                | (Dwell, Releasing | ConveyorCooldown)
                | (Releasing, Dwell | ConveyorCooldown)
        )
    }
}

impl fmt::Display for SequencePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase_str = match self {
            SequencePhase::Idle => "Idle",
            SequencePhase::Conveying => "Conveying",
            SequencePhase::AwaitingCard => "AwaitingCard",
            SequencePhase::Routing => "Routing",
            SequencePhase::AwaitingClear => "AwaitingClear",
            SequencePhase::AwaitingGap => "AwaitingGap",
            SequencePhase::Dwell => "Dwell",
            SequencePhase::Releasing => "Releasing",
            SequencePhase::ConveyorCooldown => "ConveyorCooldown",
        };
        write!(f, "{}", phase_str)
    }
}

/// A single recorded phase transition.
///
/// `spent_in_from` is the time the sequence spent in the phase being left,
/// which is what the route report and fault diagnostics care about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTransition {
    /// The phase transitioned from.
    pub from: SequencePhase,

    /// The phase transitioned to.
    pub to: SequencePhase,

    /// Time spent in `from` before this transition.
    pub spent_in_from: Duration,
}

/// Tracks the current phase of a sequencer and its transition history.
///
/// Not thread-safe by design: one tracker belongs to one sequencer, which
/// itself runs one sequence at a time.
#[derive(Debug)]
pub struct PhaseTracker {
    current: SequencePhase,
    entered_at: Instant,
    history: VecDeque<PhaseTransition>,
}

impl PhaseTracker {
    /// Create a tracker in the `Idle` phase.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: SequencePhase::Idle,
            entered_at: Instant::now(),
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    /// Current phase.
    #[must_use]
    pub fn current(&self) -> SequencePhase {
        self.current
    }

    /// Time elapsed in the current phase.
    #[must_use]
    pub fn time_in_phase(&self) -> Duration {
        self.entered_at.elapsed()
    }

    /// Recorded transitions, oldest first.
    #[must_use]
    pub fn history(&self) -> &VecDeque<PhaseTransition> {
        &self.history
    }

    /// Drop all recorded transitions.
    ///
    /// Called at the start of each routing run so the history describes
    /// exactly one card.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Transition to a new phase, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPhaseTransition` if the requested transition
    /// is not legal from the current phase.
    pub fn advance(&mut self, to: SequencePhase) -> Result<PhaseTransition> {
        if !self.current.can_transition_to(&to) {
            return Err(Error::InvalidPhaseTransition {
                from: self.current.to_string(),
                to: to.to_string(),
            });
        }

        let transition = PhaseTransition {
            from: self.current,
            to,
            spent_in_from: self.entered_at.elapsed(),
        };

        tracing::debug!(from = %transition.from, to = %transition.to,
            spent_ms = transition.spent_in_from.as_millis() as u64,
            "phase transition");

        self.current = to;
        self.entered_at = Instant::now();
        self.push_history(transition.clone());

        Ok(transition)
    }

    /// Force the tracker back to `Idle`, recording the abort.
    ///
    /// Used on faults and cancellation, where the abort-to-Idle edge is
    /// always legal.
    pub fn abort(&mut self) -> PhaseTransition {
        let transition = PhaseTransition {
            from: self.current,
            to: SequencePhase::Idle,
            spent_in_from: self.entered_at.elapsed(),
        };
        self.current = SequencePhase::Idle;
        self.entered_at = Instant::now();
        self.push_history(transition.clone());
        transition
    }

    fn push_history(&mut self, transition: PhaseTransition) {
        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}
