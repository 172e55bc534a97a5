//! GPIO backend trait definition.
//!
//! This module defines the contract between the sort sequencer and a
//! digital I/O implementation. The methods are synchronous: a pin write is
//! a register operation, and keeping the contract synchronous lets release
//! guards run in `Drop` on every exit path. The blocking, timeout-bounded
//! sensor waits live one layer up, in the sequencer crate.

use crate::error::Result;
use crate::types::{ActuatorGroup, ChannelConfig, ChannelId, LogicLevel};

/// Digital I/O capability used by the actuation path.
///
/// Implementations must uphold three rules:
///
/// - `configure` is idempotent for an identical configuration and fails
///   with [`GpioError::ConfigurationConflict`](crate::GpioError) for a
///   differing one unless preceded by `reset`.
/// - `write` never fails for a channel configured as an output and fails
///   with [`GpioError::NotConfigured`](crate::GpioError) otherwise; `read`
///   mirrors this for inputs.
/// - `reset` de-energizes every configured output before clearing the
///   configuration, and calling it twice is equivalent to calling it once.
///
/// # Examples
///
/// ```
/// use cardsort_gpio::{ChannelConfig, ChannelId, GpioBackend, LogicLevel, MemoryGpio, PullMode};
///
/// # fn main() -> cardsort_gpio::Result<()> {
/// let (mut gpio, handle) = MemoryGpio::new();
///
/// let sensor = ChannelId::new(24)?;
/// gpio.configure(sensor, ChannelConfig::input(PullMode::Down))?;
/// assert_eq!(gpio.read(sensor)?, LogicLevel::Low);
///
/// handle.set_input_level(sensor, LogicLevel::High)?;
/// assert_eq!(gpio.read(sensor)?, LogicLevel::High);
/// # Ok(())
/// # }
/// ```
pub trait GpioBackend: Send {
    /// Configure a channel.
    ///
    /// Re-invocation with an identical configuration is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The channel is already configured with different parameters
    /// - The underlying driver rejects the channel
    fn configure(&mut self, channel: ChannelId, config: ChannelConfig) -> Result<()>;

    /// Drive an output channel to the energized or released state.
    ///
    /// The logic level actually written follows the channel's
    /// [`ActiveLevel`](crate::ActiveLevel) wiring convention.
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` if the channel is not configured as an
    /// output.
    fn write(&mut self, channel: ChannelId, energized: bool) -> Result<()>;

    /// Sample the current logic level of an input channel.
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` if the channel is not configured as an
    /// input.
    fn read(&self, channel: ChannelId) -> Result<LogicLevel>;

    /// De-energize all configured outputs and clear all configuration.
    ///
    /// Invoked defensively at process startup (to recover from a prior
    /// crash that left relays energized) and exactly once at shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error only if the underlying driver fails; the simulator
    /// never does.
    fn reset(&mut self) -> Result<()>;

    /// Drive every member of an actuator group to the commanded state.
    ///
    /// All member channels are written before this returns, so no caller
    /// can observe the group "partially energized" for longer than the
    /// underlying write latency. If a member write fails the remaining
    /// members are still driven, and the first error is returned.
    ///
    /// # Errors
    ///
    /// Returns the first member error encountered, after attempting every
    /// member.
    fn write_group(&mut self, group: &ActuatorGroup, energized: bool) -> Result<()> {
        let mut first_err = None;
        for &channel in group.channels() {
            if let Err(e) = self.write(channel, energized) {
                tracing::warn!(
                    group = group.name(),
                    %channel,
                    error = %e,
                    "group member write failed"
                );
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
