//! Timeout-bounded sensor polling.
//!
//! [`wait_for_level`] is the only place the sequencer touches time while
//! watching the light barrier. It samples the input at a fixed interval
//! until the target level appears or the timeout expires, checking the
//! stop signal on every iteration. A platform with edge interrupts could
//! replace the sampling loop without touching the sequencer, which only
//! depends on this function's contract.

use crate::stop::{StopSignal, sleep_cancellable};
use cardsort_gpio::{ChannelId, GpioBackend, GpioError, LogicLevel};
use std::time::Duration;
use tokio::time::Instant;

/// Failure modes of a bounded sensor wait.
#[derive(Debug, thiserror::Error)]
pub enum WaitError {
    /// The target level did not appear within the timeout.
    #[error("Level not reached within {elapsed:?}")]
    Timeout { elapsed: Duration },

    /// The stop signal fired mid-wait.
    #[error("Wait cancelled")]
    Cancelled,

    /// Reading the input channel failed.
    #[error(transparent)]
    Gpio(#[from] GpioError),
}

/// Block until `channel` samples at `target`, up to `timeout`.
///
/// Samples at `poll_interval`; the interval must be short relative to the
/// shortest dwell in the sequence or a brief transition can be missed.
/// Returns the elapsed wait on success.
///
/// # Errors
///
/// - [`WaitError::Timeout`] if `timeout` elapses first — the primary
///   operational fault (card missing or jammed).
/// - [`WaitError::Cancelled`] if the stop signal fires; checked every
///   iteration so cancellation lands within one poll interval.
/// - [`WaitError::Gpio`] if the channel is not configured as an input.
pub async fn wait_for_level<G: GpioBackend>(
    gpio: &G,
    channel: ChannelId,
    target: LogicLevel,
    timeout: Duration,
    poll_interval: Duration,
    stop: &mut StopSignal,
) -> Result<Duration, WaitError> {
    let started = Instant::now();

    loop {
        if stop.is_stopped() {
            return Err(WaitError::Cancelled);
        }

        if gpio.read(channel)? == target {
            return Ok(started.elapsed());
        }

        let elapsed = started.elapsed();
        if elapsed >= timeout {
            tracing::warn!(%channel, %target, ?elapsed, "sensor wait timed out");
            return Err(WaitError::Timeout { elapsed });
        }

        if !sleep_cancellable(poll_interval, stop).await {
            return Err(WaitError::Cancelled);
        }
    }
}
