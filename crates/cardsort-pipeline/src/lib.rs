//! Orchestration of the full card-sorting flow.
//!
//! One [`SortPipeline::process_next`] call handles one physical card:
//!
//! 1. The identifier produces a corrected name (or none).
//! 2. For recognized names, the metadata provider is asked for price,
//!    color identity, mana cost, and type line.
//! 3. The stored sorting rules are evaluated against the card's profile.
//!    An unrecognized card always evaluates to left — that policy lives in
//!    the rule evaluation, never in the sequencer.
//! 4. The sequencer physically routes the card.
//! 5. The scan record, including its routed direction, is persisted.
//!
//! A sequencer fault aborts the card before anything is stored; whether to
//! retry, skip, or halt is the caller's decision.

pub mod error;
pub mod pipeline;

pub use error::{PipelineError, PipelineResult};
pub use pipeline::{PipelineOutcome, SortPipeline};
