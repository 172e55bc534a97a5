//! Pin layout and per-direction timing tables.
//!
//! The observed hardware revisions differ in relay polarity and in which
//! actuators fire when for each direction. Both differences are data, not
//! code: polarity is fixed per channel by its
//! [`ActiveLevel`](cardsort_gpio::ActiveLevel) wiring convention, and the
//! per-direction choreography is a [`DirectionPlan`] step table consumed
//! by one generic walk in the sequencer. The sequencer never branches on
//! direction or wiring.

use cardsort_core::SortDirection;
use cardsort_core::constants::{
    DEFAULT_CONVEYOR_PIN, DEFAULT_FLAP_A_PIN, DEFAULT_FLAP_B_PIN, DEFAULT_MAIN_SORT_PIN,
    DEFAULT_SENSOR_PIN, FLAP_PULSE_MS, LEFT_MAIN_ENGAGE_OFFSET_MS,
};
use cardsort_gpio::{
    ActiveLevel, ActuatorGroup, ChannelConfig, ChannelId, GpioBackend, LogicLevel, PullMode,
    Result as GpioResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Actuator addressed by a timing-table step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorRole {
    /// Conveyor motor relay.
    Conveyor,

    /// Ganged sorting-flap relay pair.
    Flaps,

    /// Main sorting mechanism relay.
    MainSort,
}

impl fmt::Display for ActuatorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActuatorRole::Conveyor => write!(f, "conveyor"),
            ActuatorRole::Flaps => write!(f, "flaps"),
            ActuatorRole::MainSort => write!(f, "main_sort"),
        }
    }
}

/// One step of a direction timing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStep {
    /// Energize an actuator group.
    Engage(ActuatorRole),

    /// Release an actuator group.
    Release(ActuatorRole),

    /// Hold the current actuator state for a fixed duration. Implemented
    /// as an interruptible sleep; never a sensor wait.
    Hold(Duration),
}

/// Per-direction choreography.
///
/// `on_arrival` runs when the card's leading edge reaches the barrier;
/// `on_gap` runs after the cycle boundary. Between them the shared
/// skeleton waits for the trailing edge and the gap. The tables encode the
/// observed differences:
///
/// - **Right**: the main relay engages on arrival; after the gap the flap
///   pair pulses for the flap dwell and everything releases together.
/// - **Left**: the flap pair engages on arrival with the main relay
///   following after a fixed offset; after the gap the flaps release first
///   and the main relay holds on for the flap dwell before releasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionPlan {
    direction: SortDirection,
    on_arrival: Vec<PlanStep>,
    on_gap: Vec<PlanStep>,
}

impl DirectionPlan {
    /// Timing table for the right-hand path.
    #[must_use]
    pub fn right() -> Self {
        Self {
            direction: SortDirection::Right,
            on_arrival: vec![PlanStep::Engage(ActuatorRole::MainSort)],
            on_gap: vec![
                PlanStep::Engage(ActuatorRole::Flaps),
                PlanStep::Hold(Duration::from_millis(FLAP_PULSE_MS)),
                PlanStep::Release(ActuatorRole::Flaps),
                PlanStep::Release(ActuatorRole::MainSort),
            ],
        }
    }

    /// Timing table for the left-hand path.
    #[must_use]
    pub fn left() -> Self {
        Self {
            direction: SortDirection::Left,
            on_arrival: vec![
                PlanStep::Engage(ActuatorRole::Flaps),
                PlanStep::Hold(Duration::from_millis(LEFT_MAIN_ENGAGE_OFFSET_MS)),
                PlanStep::Engage(ActuatorRole::MainSort),
            ],
            on_gap: vec![
                PlanStep::Release(ActuatorRole::Flaps),
                PlanStep::Hold(Duration::from_millis(FLAP_PULSE_MS)),
                PlanStep::Release(ActuatorRole::MainSort),
            ],
        }
    }

    /// Table for the given direction.
    #[must_use]
    pub fn for_direction(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Left => Self::left(),
            SortDirection::Right => Self::right(),
        }
    }

    /// Direction this table routes.
    #[must_use]
    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Steps executed when the card's leading edge arrives.
    #[must_use]
    pub fn on_arrival(&self) -> &[PlanStep] {
        &self.on_arrival
    }

    /// Steps executed after the cycle boundary.
    #[must_use]
    pub fn on_gap(&self) -> &[PlanStep] {
        &self.on_gap
    }
}

/// Physical pin assignment and wiring conventions of one sorter unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SorterPins {
    /// Conveyor motor relay group.
    pub conveyor: ActuatorGroup,

    /// Ganged sorting-flap relay pair.
    pub flaps: ActuatorGroup,

    /// Main sorting mechanism relay group.
    pub main_sort: ActuatorGroup,

    /// Light barrier input channel.
    pub sensor: ChannelId,

    /// Pull resistor on the sensor input.
    pub sensor_pull: PullMode,

    /// Logic level the sensor presents while a card breaks the beam.
    pub sensor_interrupted: LogicLevel,

    /// Relay wiring convention, applied to every actuator channel.
    pub active_level: ActiveLevel,
}

impl SorterPins {
    /// Pin layout of the reference hardware: conveyor on GPIO23, sensor on
    /// GPIO24 (pull-down, interrupted = HIGH), flap pair on GPIO14+15,
    /// main relay on GPIO18.
    ///
    /// # Errors
    /// Never fails for the built-in pin numbers; returns `Result` because
    /// group construction validates.
    pub fn default_layout(active_level: ActiveLevel) -> GpioResult<Self> {
        Ok(Self {
            conveyor: ActuatorGroup::single("conveyor", ChannelId::new(DEFAULT_CONVEYOR_PIN)?)?,
            flaps: ActuatorGroup::new(
                "flaps",
                vec![
                    ChannelId::new(DEFAULT_FLAP_A_PIN)?,
                    ChannelId::new(DEFAULT_FLAP_B_PIN)?,
                ],
            )?,
            main_sort: ActuatorGroup::single("main_sort", ChannelId::new(DEFAULT_MAIN_SORT_PIN)?)?,
            sensor: ChannelId::new(DEFAULT_SENSOR_PIN)?,
            sensor_pull: PullMode::Down,
            sensor_interrupted: LogicLevel::High,
            active_level,
        })
    }

    /// Actuator group for a role.
    #[must_use]
    pub fn group(&self, role: ActuatorRole) -> &ActuatorGroup {
        match role {
            ActuatorRole::Conveyor => &self.conveyor,
            ActuatorRole::Flaps => &self.flaps,
            ActuatorRole::MainSort => &self.main_sort,
        }
    }

    /// Logic level the sensor presents for the given beam state.
    #[must_use]
    pub fn sensor_level(&self, interrupted: bool) -> LogicLevel {
        if interrupted {
            self.sensor_interrupted
        } else {
            self.sensor_interrupted.inverted()
        }
    }

    /// Configure every channel on the backend.
    ///
    /// All actuators start released; the sensor gets its pull mode.
    ///
    /// # Errors
    /// Propagates configuration conflicts from the backend.
    pub fn configure_all<G: GpioBackend>(&self, gpio: &mut G) -> GpioResult<()> {
        let output = ChannelConfig::output(self.active_level);
        for role in [
            ActuatorRole::Conveyor,
            ActuatorRole::Flaps,
            ActuatorRole::MainSort,
        ] {
            for &channel in self.group(role).channels() {
                gpio.configure(channel, output)?;
            }
        }
        gpio.configure(self.sensor, ChannelConfig::input(self.sensor_pull))?;
        Ok(())
    }
}
