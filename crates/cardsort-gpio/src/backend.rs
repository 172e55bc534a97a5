//! Enum wrapper for GPIO backend dispatch.
//!
//! The backend is chosen exactly once at process start (simulator for
//! development and tests, Raspberry Pi hardware in production); sequencing
//! code receives an [`AnyGpioBackend`] and never branches on which one it
//! got. The enum keeps dispatch concrete so the trait's default methods
//! monomorphize instead of going through a vtable.

use crate::error::Result;
use crate::memory::MemoryGpio;
use crate::traits::GpioBackend;
use crate::types::{ChannelConfig, ChannelId, LogicLevel};

#[cfg(feature = "hardware-rppal")]
use crate::hardware::RppalGpio;

/// Backend selected at process start.
///
/// # Examples
///
/// ```
/// use cardsort_gpio::{AnyGpioBackend, GpioBackend, MemoryGpio};
///
/// let (gpio, _handle) = MemoryGpio::new();
/// let mut backend = AnyGpioBackend::Memory(gpio);
/// backend.reset().unwrap();
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyGpioBackend {
    /// In-memory simulator for development and testing.
    Memory(MemoryGpio),

    /// Raspberry Pi GPIO header via rppal.
    #[cfg(feature = "hardware-rppal")]
    Rppal(RppalGpio),
}

impl GpioBackend for AnyGpioBackend {
    fn configure(&mut self, channel: ChannelId, config: ChannelConfig) -> Result<()> {
        match self {
            Self::Memory(backend) => backend.configure(channel, config),
            #[cfg(feature = "hardware-rppal")]
            Self::Rppal(backend) => backend.configure(channel, config),
        }
    }

    fn write(&mut self, channel: ChannelId, energized: bool) -> Result<()> {
        match self {
            Self::Memory(backend) => backend.write(channel, energized),
            #[cfg(feature = "hardware-rppal")]
            Self::Rppal(backend) => backend.write(channel, energized),
        }
    }

    fn read(&self, channel: ChannelId) -> Result<LogicLevel> {
        match self {
            Self::Memory(backend) => backend.read(channel),
            #[cfg(feature = "hardware-rppal")]
            Self::Rppal(backend) => backend.read(channel),
        }
    }

    fn reset(&mut self) -> Result<()> {
        match self {
            Self::Memory(backend) => backend.reset(),
            #[cfg(feature = "hardware-rppal")]
            Self::Rppal(backend) => backend.reset(),
        }
    }
}
