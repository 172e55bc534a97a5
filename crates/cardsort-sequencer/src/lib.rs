//! Sensor-synchronized actuation sequencer for the card sorter.
//!
//! This crate drives the physical routing of a single card: it starts the
//! conveyor, watches the light barrier for the card's leading and trailing
//! edges, fires the direction-specific relays with their dwell timings,
//! and stops the conveyor once the card has settled in its output tray.
//!
//! # Architecture
//!
//! ```text
//! route_card(direction)
//!       │
//!       ▼
//! ┌────────────┐   sensor edges    ┌──────────────┐
//! │ SortSequen-│◄─────────────────►│ light barrier │
//! │ cer        │                   └──────────────┘
//! │  phase     │   energize/release ┌──────────────┐
//! │  tracker   │──────────────────►│ GPIO backend  │
//! └────────────┘                   └──────────────┘
//! ```
//!
//! The per-direction choreography lives in a [`DirectionPlan`] timing
//! table; one generic step-walk executes either table, so the left and
//! right paths share all of their sequencing structure and none of their
//! code is duplicated.
//!
//! # Safety Property
//!
//! Whatever way `route_card` exits — success, timeout fault, GPIO error,
//! or cancellation — every actuator is driven to its released state before
//! the call returns. Faults carry the phase they occurred in and the
//! elapsed wait.
//!
//! # Cancellation
//!
//! An external stop signal (emergency stop, Ctrl-C) is checked at every
//! sensor poll and interrupts every fixed delay; see [`StopController`].

pub mod error;
pub mod phase;
pub mod poller;
pub mod sequencer;
pub mod stop;
pub mod timing;

pub use error::{SequencerFault, SequencerResult};
pub use phase::{PhaseTracker, PhaseTransition, SequencePhase};
pub use poller::{WaitError, wait_for_level};
pub use sequencer::{RouteReport, SequencerConfig, SharedSequencer, SortSequencer};
pub use stop::{StopController, StopSignal, sleep_cancellable};
pub use timing::{ActuatorRole, DirectionPlan, PlanStep, SorterPins};
