//! In-memory GPIO simulator for testing and development.
//!
//! This module provides a simulated pin bank that can be controlled
//! programmatically without physical hardware. The simulator comes in two
//! halves: [`MemoryGpio`] implements [`GpioBackend`] and is handed to the
//! sequencer, while the cloneable [`MemoryGpioHandle`] scripts input levels
//! and observes output state from test code.

use crate::error::{GpioError, Result};
use crate::traits::GpioBackend;
use crate::types::{ChannelConfig, ChannelId, LogicLevel, PinDirection};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Recorded simulator operation, in call order.
///
/// The event log is how scenario tests assert the *ordering* of pin
/// transitions, independent of their timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpioEvent {
    /// A channel was configured.
    Configured { channel: ChannelId },

    /// An output channel was driven.
    Wrote {
        channel: ChannelId,
        energized: bool,
        level: LogicLevel,
    },

    /// All configuration was cleared.
    Reset,
}

#[derive(Debug)]
enum ChannelState {
    Output {
        config: ChannelConfig,
        energized: bool,
    },
    Input {
        config: ChannelConfig,
        level: LogicLevel,
    },
}

impl ChannelState {
    fn config(&self) -> &ChannelConfig {
        match self {
            ChannelState::Output { config, .. } | ChannelState::Input { config, .. } => config,
        }
    }
}

#[derive(Debug, Default)]
struct Bank {
    channels: HashMap<ChannelId, ChannelState>,
    events: Vec<GpioEvent>,
}

fn lock(bank: &Arc<Mutex<Bank>>) -> MutexGuard<'_, Bank> {
    // A poisoned lock only means another test thread panicked mid-write;
    // the bank itself is still a plain value.
    bank.lock().unwrap_or_else(|e| e.into_inner())
}

/// In-memory GPIO backend.
///
/// # Examples
///
/// ```
/// use cardsort_gpio::{
///     ActiveLevel, ChannelConfig, ChannelId, GpioBackend, MemoryGpio,
/// };
///
/// # fn main() -> cardsort_gpio::Result<()> {
/// let (mut gpio, handle) = MemoryGpio::new();
///
/// let motor = ChannelId::new(23)?;
/// gpio.configure(motor, ChannelConfig::output(ActiveLevel::ActiveHigh))?;
/// gpio.write(motor, true)?;
///
/// assert!(handle.is_energized(motor)?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryGpio {
    bank: Arc<Mutex<Bank>>,
}

impl MemoryGpio {
    /// Create a new simulator.
    ///
    /// Returns a tuple of (MemoryGpio, MemoryGpioHandle) where the handle
    /// can be used to script sensor levels and inspect actuator state.
    pub fn new() -> (Self, MemoryGpioHandle) {
        let bank = Arc::new(Mutex::new(Bank::default()));
        let gpio = Self { bank: bank.clone() };
        let handle = MemoryGpioHandle { bank };
        (gpio, handle)
    }
}

impl GpioBackend for MemoryGpio {
    fn configure(&mut self, channel: ChannelId, config: ChannelConfig) -> Result<()> {
        let mut bank = lock(&self.bank);

        if let Some(existing) = bank.channels.get(&channel) {
            if *existing.config() == config {
                return Ok(());
            }
            return Err(GpioError::configuration_conflict(channel.as_u8()));
        }

        let state = match config.direction {
            PinDirection::Output => ChannelState::Output {
                config,
                energized: config.initial_energized,
            },
            PinDirection::Input => ChannelState::Input {
                config,
                level: config.pull.idle_level(),
            },
        };

        bank.channels.insert(channel, state);
        bank.events.push(GpioEvent::Configured { channel });
        tracing::debug!(%channel, ?config, "simulator channel configured");
        Ok(())
    }

    fn write(&mut self, channel: ChannelId, energized: bool) -> Result<()> {
        let mut bank = lock(&self.bank);

        let level = match bank.channels.get_mut(&channel) {
            Some(ChannelState::Output {
                config,
                energized: state,
            }) => {
                *state = energized;
                config.active_level.level_for(energized)
            }
            _ => return Err(GpioError::not_configured(channel.as_u8())),
        };

        bank.events.push(GpioEvent::Wrote {
            channel,
            energized,
            level,
        });
        tracing::trace!(%channel, energized, %level, "simulator write");
        Ok(())
    }

    fn read(&self, channel: ChannelId) -> Result<LogicLevel> {
        let bank = lock(&self.bank);
        match bank.channels.get(&channel) {
            Some(ChannelState::Input { level, .. }) => Ok(*level),
            _ => Err(GpioError::not_configured(channel.as_u8())),
        }
    }

    fn reset(&mut self) -> Result<()> {
        let mut bank = lock(&self.bank);

        for state in bank.channels.values_mut() {
            if let ChannelState::Output { energized, .. } = state {
                *energized = false;
            }
        }
        bank.channels.clear();
        bank.events.push(GpioEvent::Reset);
        tracing::debug!("simulator reset");
        Ok(())
    }
}

/// Handle for controlling and inspecting a [`MemoryGpio`] simulator.
///
/// Cloneable so a test can move one copy into a spawned task that scripts
/// the light barrier while keeping another for assertions.
///
/// # Examples
///
/// ```
/// use cardsort_gpio::{
///     ChannelConfig, ChannelId, GpioBackend, LogicLevel, MemoryGpio, PullMode,
/// };
///
/// # fn main() -> cardsort_gpio::Result<()> {
/// let (mut gpio, handle) = MemoryGpio::new();
///
/// let sensor = ChannelId::new(24)?;
/// gpio.configure(sensor, ChannelConfig::input(PullMode::Down))?;
///
/// // Simulate a card breaking the light barrier.
/// handle.set_input_level(sensor, LogicLevel::High)?;
/// assert_eq!(gpio.read(sensor)?, LogicLevel::High);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryGpioHandle {
    bank: Arc<Mutex<Bank>>,
}

impl MemoryGpioHandle {
    /// Set the sampled level of an input channel.
    ///
    /// # Errors
    /// Returns `NotConfigured` if the channel is not an input.
    pub fn set_input_level(&self, channel: ChannelId, level: LogicLevel) -> Result<()> {
        let mut bank = lock(&self.bank);
        match bank.channels.get_mut(&channel) {
            Some(ChannelState::Input { level: state, .. }) => {
                *state = level;
                Ok(())
            }
            _ => Err(GpioError::not_configured(channel.as_u8())),
        }
    }

    /// Whether an output channel is currently energized.
    ///
    /// # Errors
    /// Returns `NotConfigured` if the channel is not an output.
    pub fn is_energized(&self, channel: ChannelId) -> Result<bool> {
        let bank = lock(&self.bank);
        match bank.channels.get(&channel) {
            Some(ChannelState::Output { energized, .. }) => Ok(*energized),
            _ => Err(GpioError::not_configured(channel.as_u8())),
        }
    }

    /// Logic level an output channel currently presents.
    ///
    /// # Errors
    /// Returns `NotConfigured` if the channel is not an output.
    pub fn output_level(&self, channel: ChannelId) -> Result<LogicLevel> {
        let bank = lock(&self.bank);
        match bank.channels.get(&channel) {
            Some(ChannelState::Output { config, energized }) => {
                Ok(config.active_level.level_for(*energized))
            }
            _ => Err(GpioError::not_configured(channel.as_u8())),
        }
    }

    /// Returns `true` if no configured output is energized.
    ///
    /// This is the "safe shutdown" predicate the actuation tests assert on
    /// every exit path.
    #[must_use]
    pub fn all_outputs_released(&self) -> bool {
        let bank = lock(&self.bank);
        bank.channels.values().all(|state| match state {
            ChannelState::Output { energized, .. } => !energized,
            ChannelState::Input { .. } => true,
        })
    }

    /// Snapshot of the recorded event log.
    #[must_use]
    pub fn events(&self) -> Vec<GpioEvent> {
        lock(&self.bank).events.clone()
    }

    /// Clear the recorded event log.
    pub fn clear_events(&self) {
        lock(&self.bank).events.clear();
    }

    /// Number of currently configured channels.
    #[must_use]
    pub fn configured_count(&self) -> usize {
        lock(&self.bank).channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActiveLevel, PullMode};

    fn output(n: u8) -> (ChannelId, ChannelConfig) {
        (
            ChannelId::new(n).unwrap(),
            ChannelConfig::output(ActiveLevel::ActiveHigh),
        )
    }

    #[test]
    fn test_configure_is_idempotent_for_same_config() {
        let (mut gpio, _handle) = MemoryGpio::new();
        let (ch, config) = output(23);

        gpio.configure(ch, config).unwrap();
        gpio.configure(ch, config).unwrap();
    }

    #[test]
    fn test_configure_conflict_without_reset() {
        let (mut gpio, _handle) = MemoryGpio::new();
        let ch = ChannelId::new(23).unwrap();

        gpio.configure(ch, ChannelConfig::output(ActiveLevel::ActiveHigh))
            .unwrap();
        let result = gpio.configure(ch, ChannelConfig::output(ActiveLevel::ActiveLow));
        assert!(matches!(
            result,
            Err(GpioError::ConfigurationConflict { channel: 23 })
        ));

        // After a reset the new configuration is accepted.
        gpio.reset().unwrap();
        gpio.configure(ch, ChannelConfig::output(ActiveLevel::ActiveLow))
            .unwrap();
    }

    #[test]
    fn test_write_requires_output_configuration() {
        let (mut gpio, _handle) = MemoryGpio::new();
        let ch = ChannelId::new(23).unwrap();

        assert!(matches!(
            gpio.write(ch, true),
            Err(GpioError::NotConfigured { channel: 23 })
        ));

        gpio.configure(ch, ChannelConfig::input(PullMode::Down))
            .unwrap();
        assert!(gpio.write(ch, true).is_err());
    }

    #[test]
    fn test_read_requires_input_configuration() {
        let (mut gpio, _handle) = MemoryGpio::new();
        let (ch, config) = output(23);
        gpio.configure(ch, config).unwrap();

        assert!(matches!(
            gpio.read(ch),
            Err(GpioError::NotConfigured { channel: 23 })
        ));
    }

    #[test]
    fn test_input_starts_at_pull_idle_level() {
        let (mut gpio, _handle) = MemoryGpio::new();
        let down = ChannelId::new(24).unwrap();
        let up = ChannelId::new(25).unwrap();

        gpio.configure(down, ChannelConfig::input(PullMode::Down))
            .unwrap();
        gpio.configure(up, ChannelConfig::input(PullMode::Up))
            .unwrap();

        assert_eq!(gpio.read(down).unwrap(), LogicLevel::Low);
        assert_eq!(gpio.read(up).unwrap(), LogicLevel::High);
    }

    #[test]
    fn test_active_low_write_produces_inverted_level() {
        let (mut gpio, handle) = MemoryGpio::new();
        let ch = ChannelId::new(18).unwrap();
        gpio.configure(ch, ChannelConfig::output(ActiveLevel::ActiveLow))
            .unwrap();

        gpio.write(ch, true).unwrap();
        assert!(handle.is_energized(ch).unwrap());
        assert_eq!(handle.output_level(ch).unwrap(), LogicLevel::Low);

        gpio.write(ch, false).unwrap();
        assert_eq!(handle.output_level(ch).unwrap(), LogicLevel::High);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let (mut gpio, handle) = MemoryGpio::new();
        let (ch, config) = output(23);
        gpio.configure(ch, config).unwrap();
        gpio.write(ch, true).unwrap();

        gpio.reset().unwrap();
        assert_eq!(handle.configured_count(), 0);
        assert!(handle.all_outputs_released());

        // Second reset leaves identical state.
        gpio.reset().unwrap();
        assert_eq!(handle.configured_count(), 0);
        assert!(handle.all_outputs_released());
    }

    #[test]
    fn test_event_log_preserves_write_order() {
        let (mut gpio, handle) = MemoryGpio::new();
        let (motor, config) = output(23);
        let (flap, _) = output(14);
        gpio.configure(motor, config).unwrap();
        gpio.configure(flap, config).unwrap();
        handle.clear_events();

        gpio.write(motor, true).unwrap();
        gpio.write(flap, true).unwrap();
        gpio.write(flap, false).unwrap();

        let events = handle.events();
        assert_eq!(
            events,
            vec![
                GpioEvent::Wrote {
                    channel: motor,
                    energized: true,
                    level: LogicLevel::High,
                },
                GpioEvent::Wrote {
                    channel: flap,
                    energized: true,
                    level: LogicLevel::High,
                },
                GpioEvent::Wrote {
                    channel: flap,
                    energized: false,
                    level: LogicLevel::Low,
                },
            ]
        );
    }

    #[test]
    fn test_handle_scripts_sensor_from_clone() {
        let (mut gpio, handle) = MemoryGpio::new();
        let sensor = ChannelId::new(24).unwrap();
        gpio.configure(sensor, ChannelConfig::input(PullMode::Down))
            .unwrap();

        let scripted = handle.clone();
        scripted.set_input_level(sensor, LogicLevel::High).unwrap();

        assert_eq!(gpio.read(sensor).unwrap(), LogicLevel::High);
    }
}
