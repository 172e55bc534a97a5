//! Timing constants for the card-sort actuation path.
//!
//! The values in this module were measured against the physical sorter
//! mechanism (conveyor speed, flap solenoid response, light-barrier
//! geometry). They are centralized here so that the sequencer, its
//! configuration defaults, and the tests all agree on a single source.
//!
//! All durations are expressed in milliseconds and converted to
//! `std::time::Duration` at the call site.

// ============================================================================
// Sensor Polling
// ============================================================================

/// Interval between consecutive light-barrier samples (milliseconds).
///
/// Must stay short relative to the shortest dwell in the sequence
/// ([`FLAP_PULSE_MS`]) or a brief beam transition can be missed entirely.
///
/// # Value: 10ms
pub const SENSOR_POLL_INTERVAL_MS: u64 = 10;

// ============================================================================
// Actuator Dwells
// ============================================================================

/// Hold duration for the flap pair pulse on the right-hand path, and for
/// the main relay's trailing hold on the left-hand path (milliseconds).
///
/// # Value: 25ms
pub const FLAP_PULSE_MS: u64 = 25;

/// Fixed offset between energizing the flap pair and energizing the main
/// sort relay on the left-hand path (milliseconds). This is a plain delay,
/// not a sensor wait.
///
/// # Value: 10ms
pub const LEFT_MAIN_ENGAGE_OFFSET_MS: u64 = 10;

/// Settle time between releasing the routing actuators and stopping the
/// conveyor (milliseconds). The card is already past the flap at this
/// point; the conveyor keeps moving long enough to carry it fully into
/// the output tray.
///
/// # Value: 600ms
pub const CONVEYOR_COOLDOWN_MS: u64 = 600;

// ============================================================================
// Timeout Bounds
// ============================================================================

/// Maximum wait for a card to reach the light barrier after the conveyor
/// starts (milliseconds). Expiry means no card was fed.
///
/// # Value: 10000ms (10 seconds)
pub const DEFAULT_ARRIVAL_TIMEOUT_MS: u64 = 10_000;

/// Maximum wait for a card to clear the light barrier once detected
/// (milliseconds). Expiry means the card jammed in front of the sensor.
///
/// # Value: 5000ms (5 seconds)
pub const DEFAULT_TRANSIT_TIMEOUT_MS: u64 = 5_000;

/// Maximum wait for the cycle boundary (gap or next card) after the card
/// clears the barrier (milliseconds).
///
/// # Value: 5000ms (5 seconds)
pub const DEFAULT_GAP_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// Default Pin Assignment (BCM numbering)
// ============================================================================

/// Conveyor motor relay.
pub const DEFAULT_CONVEYOR_PIN: u8 = 23;

/// Light barrier input (interrupted = beam broken by a card).
pub const DEFAULT_SENSOR_PIN: u8 = 24;

/// Sorting flap relay, first driver input.
pub const DEFAULT_FLAP_A_PIN: u8 = 14;

/// Sorting flap relay, second driver input. Ganged with
/// [`DEFAULT_FLAP_A_PIN`]; the pair must always switch together.
pub const DEFAULT_FLAP_B_PIN: u8 = 15;

/// Main sorting mechanism relay.
pub const DEFAULT_MAIN_SORT_PIN: u8 = 18;
