//! Digital I/O abstraction for the card-sorter actuation hardware.
//!
//! This crate provides the pin-level contract between the sort sequencer
//! and the physical sorter (conveyor motor relay, sorting-flap relays,
//! light-barrier input), with implementations for an in-memory simulator
//! and, behind the `hardware-rppal` feature, the Raspberry Pi GPIO header.
//!
//! # Design Philosophy
//!
//! - **Energize, not levels**: callers command actuators in terms of
//!   `energized = true/false`. The mapping to a logic level is fixed once
//!   per channel by its [`ActiveLevel`] wiring convention; sequencing code
//!   never tests polarity.
//! - **Configuration is immutable**: a channel's direction and energized
//!   mapping are fixed for the lifetime of the process once configured.
//!   Reconfiguring with different parameters fails with
//!   [`GpioError::ConfigurationConflict`] unless preceded by
//!   [`GpioBackend::reset`].
//! - **Ganged outputs**: relay driver inputs that must switch together are
//!   modeled as an [`ActuatorGroup`]; group writes drive every member to
//!   the commanded state before returning.
//! - **No call-site branching**: backends are selected once at process
//!   start through [`AnyGpioBackend`] (enum dispatch, since the trait
//!   stays usable without boxing).
//!
//! # Examples
//!
//! ```
//! use cardsort_gpio::{ActiveLevel, ChannelConfig, ChannelId, GpioBackend, MemoryGpio};
//!
//! # fn main() -> cardsort_gpio::Result<()> {
//! let (mut gpio, handle) = MemoryGpio::new();
//!
//! let motor = ChannelId::new(23)?;
//! gpio.configure(motor, ChannelConfig::output(ActiveLevel::ActiveHigh))?;
//!
//! gpio.write(motor, true)?;
//! assert!(handle.is_energized(motor)?);
//!
//! gpio.reset()?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

#[cfg(feature = "hardware-rppal")]
pub mod hardware;

// Re-export commonly used types for convenience
pub use backend::AnyGpioBackend;
pub use error::{GpioError, Result};
pub use memory::{GpioEvent, MemoryGpio, MemoryGpioHandle};
pub use traits::GpioBackend;
pub use types::{ActiveLevel, ActuatorGroup, ChannelConfig, ChannelId, LogicLevel, PinDirection, PullMode};

#[cfg(feature = "hardware-rppal")]
pub use hardware::RppalGpio;
