//! Channel, level, and group types shared by all GPIO backends.

use crate::error::{GpioError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest usable BCM channel number on the 40-pin header.
pub const MAX_CHANNEL: u8 = 27;

/// Opaque identifier for a physical pin (BCM numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(u8);

impl ChannelId {
    /// Create a new channel id with validation.
    ///
    /// # Errors
    /// Returns `GpioError::InvalidChannel` if the number is outside the
    /// header range (0-27).
    pub fn new(channel: u8) -> Result<Self> {
        if channel > MAX_CHANNEL {
            return Err(GpioError::invalid_channel(channel));
        }
        Ok(ChannelId(channel))
    }

    /// Get the raw BCM channel number.
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

/// Role a channel plays once configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinDirection {
    /// Drives an actuator (relay input).
    Output,

    /// Samples a sensor (light barrier).
    Input,
}

/// Internal pull resistor applied to an input channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PullMode {
    /// No internal pull; the external circuit defines the idle level.
    Floating,

    /// Pull-up resistor; idle level is HIGH.
    Up,

    /// Pull-down resistor; idle level is LOW.
    Down,
}

impl PullMode {
    /// Logic level an unconnected input settles at under this pull mode.
    ///
    /// A floating input has no defined idle level; the simulator treats it
    /// as LOW.
    #[must_use]
    pub fn idle_level(&self) -> LogicLevel {
        match self {
            PullMode::Up => LogicLevel::High,
            PullMode::Down | PullMode::Floating => LogicLevel::Low,
        }
    }
}

/// Sampled logic level of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicLevel {
    /// Logic high.
    High,

    /// Logic low.
    Low,
}

impl LogicLevel {
    /// The opposite level.
    #[must_use]
    pub fn inverted(self) -> Self {
        match self {
            LogicLevel::High => LogicLevel::Low,
            LogicLevel::Low => LogicLevel::High,
        }
    }

    /// Returns `true` for [`LogicLevel::High`].
    #[inline]
    #[must_use]
    pub fn is_high(self) -> bool {
        matches!(self, LogicLevel::High)
    }
}

impl fmt::Display for LogicLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicLevel::High => write!(f, "HIGH"),
            LogicLevel::Low => write!(f, "LOW"),
        }
    }
}

/// Wiring convention of an actuator channel.
///
/// Relay boards come in two flavors: boards whose driver input energizes
/// the coil on logic HIGH, and boards that energize on logic LOW. The
/// convention is fixed once at configuration time; sequencing code only
/// ever commands "energized" or "released".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveLevel {
    /// Logic HIGH energizes the actuator.
    ActiveHigh,

    /// Logic LOW energizes the actuator.
    ActiveLow,
}

impl ActiveLevel {
    /// Logic level that energizes an actuator wired with this convention.
    #[must_use]
    pub fn energized_level(&self) -> LogicLevel {
        match self {
            ActiveLevel::ActiveHigh => LogicLevel::High,
            ActiveLevel::ActiveLow => LogicLevel::Low,
        }
    }

    /// Logic level that releases an actuator wired with this convention.
    #[must_use]
    pub fn released_level(&self) -> LogicLevel {
        self.energized_level().inverted()
    }

    /// Translate an energized/released command into a logic level.
    #[must_use]
    pub fn level_for(&self, energized: bool) -> LogicLevel {
        if energized {
            self.energized_level()
        } else {
            self.released_level()
        }
    }
}

/// Full configuration of a channel.
///
/// Equality is used to decide whether a repeated `configure` call is an
/// idempotent no-op or a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Input or output role.
    pub direction: PinDirection,

    /// Pull resistor mode (inputs; ignored for outputs).
    pub pull: PullMode,

    /// Wiring convention (outputs; ignored for inputs).
    pub active_level: ActiveLevel,

    /// Whether the actuator starts energized (outputs only).
    pub initial_energized: bool,
}

impl ChannelConfig {
    /// Configuration for an actuator channel, initially released.
    #[must_use]
    pub fn output(active_level: ActiveLevel) -> Self {
        Self {
            direction: PinDirection::Output,
            pull: PullMode::Floating,
            active_level,
            initial_energized: false,
        }
    }

    /// Configuration for a sensor channel with the given pull mode.
    #[must_use]
    pub fn input(pull: PullMode) -> Self {
        Self {
            direction: PinDirection::Input,
            pull,
            // Unused for inputs; kept fixed so equality checks stay simple.
            active_level: ActiveLevel::ActiveHigh,
            initial_energized: false,
        }
    }

    /// Set the initial energized state (outputs only).
    #[must_use]
    pub fn with_initial_energized(mut self, energized: bool) -> Self {
        self.initial_energized = energized;
        self
    }

    /// Returns `true` if this configures an output channel.
    #[inline]
    #[must_use]
    pub fn is_output(&self) -> bool {
        matches!(self.direction, PinDirection::Output)
    }
}

/// Named set of output channels that must always switch together.
///
/// A group models relay driver inputs that are ganged for higher switching
/// current: the sorting flap on the observed hardware is driven through two
/// inputs that must never disagree. Writes through
/// [`GpioBackend::write_group`](crate::traits::GpioBackend::write_group)
/// drive every member to the commanded state before returning.
///
/// # Examples
///
/// ```
/// use cardsort_gpio::{ActuatorGroup, ChannelId};
///
/// # fn main() -> cardsort_gpio::Result<()> {
/// let flaps = ActuatorGroup::new(
///     "flaps",
///     vec![ChannelId::new(14)?, ChannelId::new(15)?],
/// )?;
/// assert_eq!(flaps.channels().len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuatorGroup {
    name: String,
    channels: Vec<ChannelId>,
}

impl ActuatorGroup {
    /// Create a group from a non-empty channel list.
    ///
    /// # Errors
    /// Returns `GpioError::EmptyGroup` if `channels` is empty.
    pub fn new(name: impl Into<String>, channels: Vec<ChannelId>) -> Result<Self> {
        let name = name.into();
        if channels.is_empty() {
            return Err(GpioError::empty_group(name));
        }
        Ok(Self { name, channels })
    }

    /// Create a single-channel group.
    ///
    /// # Errors
    /// Never fails for a concrete channel; returns `Result` for symmetry
    /// with [`ActuatorGroup::new`].
    pub fn single(name: impl Into<String>, channel: ChannelId) -> Result<Self> {
        Self::new(name, vec![channel])
    }

    /// Group name, used in logs and error messages.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member channels, in write order.
    #[must_use]
    pub fn channels(&self) -> &[ChannelId] {
        &self.channels
    }
}

impl fmt::Display for ActuatorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, ch) in self.channels.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", ch)?;
        }
        write!(f, ")")
    }
}
