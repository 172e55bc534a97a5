//! Raspberry Pi GPIO backend via rppal.
//!
//! Only compiled with the `hardware-rppal` feature. The backend owns its
//! pins for the process lifetime; `reset` drives every output to its
//! released level before handing the pins back to the kernel (rppal would
//! also restore them on drop, but a crash between energize and drop is
//! exactly the case the defensive startup reset exists for).

use crate::error::{GpioError, Result};
use crate::traits::GpioBackend;
use crate::types::{ChannelConfig, ChannelId, LogicLevel, PinDirection, PullMode};
use rppal::gpio::{Gpio, InputPin, Level, OutputPin};
use std::collections::HashMap;

impl From<rppal::gpio::Error> for GpioError {
    fn from(err: rppal::gpio::Error) -> Self {
        GpioError::backend(err.to_string())
    }
}

fn to_rppal(level: LogicLevel) -> Level {
    match level {
        LogicLevel::High => Level::High,
        LogicLevel::Low => Level::Low,
    }
}

fn from_rppal(level: Level) -> LogicLevel {
    match level {
        Level::High => LogicLevel::High,
        Level::Low => LogicLevel::Low,
    }
}

#[derive(Debug)]
enum PinState {
    Output {
        pin: OutputPin,
        config: ChannelConfig,
    },
    Input {
        pin: InputPin,
        config: ChannelConfig,
    },
}

impl PinState {
    fn config(&self) -> &ChannelConfig {
        match self {
            PinState::Output { config, .. } | PinState::Input { config, .. } => config,
        }
    }
}

/// GPIO backend driving the Raspberry Pi header through rppal.
#[derive(Debug)]
pub struct RppalGpio {
    gpio: Gpio,
    pins: HashMap<ChannelId, PinState>,
}

impl RppalGpio {
    /// Open the GPIO peripheral.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the GPIO character device is missing or
    /// access is denied (not running on a Pi, or missing permissions).
    pub fn new() -> Result<Self> {
        let gpio = Gpio::new()?;
        Ok(Self {
            gpio,
            pins: HashMap::new(),
        })
    }
}

impl GpioBackend for RppalGpio {
    fn configure(&mut self, channel: ChannelId, config: ChannelConfig) -> Result<()> {
        if let Some(existing) = self.pins.get(&channel) {
            if *existing.config() == config {
                return Ok(());
            }
            return Err(GpioError::configuration_conflict(channel.as_u8()));
        }

        let pin = self.gpio.get(channel.as_u8())?;
        let state = match config.direction {
            PinDirection::Output => {
                let initial = config.active_level.level_for(config.initial_energized);
                let pin = match initial {
                    LogicLevel::High => pin.into_output_high(),
                    LogicLevel::Low => pin.into_output_low(),
                };
                PinState::Output { pin, config }
            }
            PinDirection::Input => {
                let pin = match config.pull {
                    PullMode::Up => pin.into_input_pullup(),
                    PullMode::Down => pin.into_input_pulldown(),
                    PullMode::Floating => pin.into_input(),
                };
                PinState::Input { pin, config }
            }
        };

        self.pins.insert(channel, state);
        tracing::debug!(%channel, ?config, "hardware channel configured");
        Ok(())
    }

    fn write(&mut self, channel: ChannelId, energized: bool) -> Result<()> {
        match self.pins.get_mut(&channel) {
            Some(PinState::Output { pin, config }) => {
                let level = config.active_level.level_for(energized);
                pin.write(to_rppal(level));
                tracing::trace!(%channel, energized, %level, "hardware write");
                Ok(())
            }
            _ => Err(GpioError::not_configured(channel.as_u8())),
        }
    }

    fn read(&self, channel: ChannelId) -> Result<LogicLevel> {
        match self.pins.get(&channel) {
            Some(PinState::Input { pin, .. }) => Ok(from_rppal(pin.read())),
            _ => Err(GpioError::not_configured(channel.as_u8())),
        }
    }

    fn reset(&mut self) -> Result<()> {
        for state in self.pins.values_mut() {
            if let PinState::Output { pin, config } = state {
                pin.write(to_rppal(config.active_level.released_level()));
            }
        }
        self.pins.clear();
        tracing::debug!("hardware reset");
        Ok(())
    }
}
