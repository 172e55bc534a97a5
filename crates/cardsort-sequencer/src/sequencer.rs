//! The sort sequencer: one card in, one routed card (or fault) out.
//!
//! [`SortSequencer::route_card`] runs the full choreography for a single
//! card against the configured pin layout: conveyor start, leading-edge
//! wait, direction-table engage, trailing-edge and gap waits, direction-
//! table release with its dwells, and the conveyor cooldown. The shared
//! skeleton is identical for both directions; everything
//! direction-specific comes from the [`DirectionPlan`] timing table.
//!
//! # Exclusive Hardware Ownership
//!
//! The sequencer owns its GPIO backend for the duration of a call; the
//! `&mut self` receiver makes interleaved sequences unrepresentable. For
//! shared orchestration use [`SharedSequencer`], which serializes callers
//! behind a tokio mutex and rejects concurrent entry with
//! [`SequencerFault::AlreadyRunning`] through
//! [`try_route_card`](SharedSequencer::try_route_card).
//!
//! # Release Guarantee
//!
//! Every fault path funnels through one exit that forces all actuators to
//! their released state before the fault is surfaced; the success path
//! releases them as part of the choreography. No exit leaves a relay
//! energized.

use crate::error::{SequencerFault, SequencerResult};
use crate::phase::{PhaseTracker, PhaseTransition, SequencePhase};
use crate::poller::{WaitError, wait_for_level};
use crate::stop::{StopSignal, sleep_cancellable};
use crate::timing::{ActuatorRole, DirectionPlan, PlanStep, SorterPins};
use cardsort_core::SortDirection;
use cardsort_core::constants::{
    CONVEYOR_COOLDOWN_MS, DEFAULT_ARRIVAL_TIMEOUT_MS, DEFAULT_GAP_TIMEOUT_MS,
    DEFAULT_TRANSIT_TIMEOUT_MS, SENSOR_POLL_INTERVAL_MS,
};
use cardsort_gpio::GpioBackend;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// Operational timing bounds of the sequencer.
///
/// Defaults come from the measured constants in `cardsort-core`; the
/// builder methods exist mostly for tests and for slower mechanisms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencerConfig {
    /// Maximum wait for the card's leading edge.
    pub arrival_timeout: Duration,

    /// Maximum wait for the card's trailing edge.
    pub transit_timeout: Duration,

    /// Maximum wait for the cycle boundary.
    pub gap_timeout: Duration,

    /// Sensor sampling interval.
    pub poll_interval: Duration,

    /// Conveyor settle time before release.
    pub conveyor_cooldown: Duration,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            arrival_timeout: Duration::from_millis(DEFAULT_ARRIVAL_TIMEOUT_MS),
            transit_timeout: Duration::from_millis(DEFAULT_TRANSIT_TIMEOUT_MS),
            gap_timeout: Duration::from_millis(DEFAULT_GAP_TIMEOUT_MS),
            poll_interval: Duration::from_millis(SENSOR_POLL_INTERVAL_MS),
            conveyor_cooldown: Duration::from_millis(CONVEYOR_COOLDOWN_MS),
        }
    }
}

impl SequencerConfig {
    /// Set the arrival timeout.
    #[must_use]
    pub fn with_arrival_timeout(mut self, timeout: Duration) -> Self {
        self.arrival_timeout = timeout;
        self
    }

    /// Set the transit timeout.
    #[must_use]
    pub fn with_transit_timeout(mut self, timeout: Duration) -> Self {
        self.transit_timeout = timeout;
        self
    }

    /// Set the gap timeout.
    #[must_use]
    pub fn with_gap_timeout(mut self, timeout: Duration) -> Self {
        self.gap_timeout = timeout;
        self
    }

    /// Set the sensor poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Diagnostic summary of one successful routing run.
#[derive(Debug, Clone)]
pub struct RouteReport {
    /// Direction the card was routed.
    pub direction: SortDirection,

    /// Wall time from conveyor start to return.
    pub total: Duration,

    /// Phase transitions of this run, oldest first.
    pub transitions: Vec<PhaseTransition>,
}

impl RouteReport {
    /// Total time spent in a given phase during this run.
    #[must_use]
    pub fn time_in(&self, phase: SequencePhase) -> Duration {
        self.transitions
            .iter()
            .filter(|t| t.from == phase)
            .map(|t| t.spent_in_from)
            .sum()
    }
}

/// Sensor-synchronized actuation sequencer for one sorter unit.
///
/// # Examples
///
/// ```
/// use cardsort_core::SortDirection;
/// use cardsort_gpio::{ActiveLevel, LogicLevel, MemoryGpio};
/// use cardsort_sequencer::{SequencerConfig, SorterPins, SortSequencer};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let (gpio, handle) = MemoryGpio::new();
///     let pins = SorterPins::default_layout(ActiveLevel::ActiveHigh)?;
///     let sensor = pins.sensor;
///
///     let mut sequencer = SortSequencer::new(gpio, pins, SequencerConfig::default())?;
///
///     // Script a card passing the light barrier.
///     tokio::spawn(async move {
///         for (delay_ms, level) in [(30, LogicLevel::High), (60, LogicLevel::Low), (30, LogicLevel::High)] {
///             tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
///             let _ = handle.set_input_level(sensor, level);
///         }
///     });
///
///     let report = sequencer.route_card(SortDirection::Right).await?;
///     assert_eq!(report.direction, SortDirection::Right);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct SortSequencer<G: GpioBackend> {
    gpio: G,
    pins: SorterPins,
    config: SequencerConfig,
    tracker: PhaseTracker,
    stop: StopSignal,
}

impl<G: GpioBackend> SortSequencer<G> {
    /// Create a sequencer, taking ownership of the backend.
    ///
    /// Performs the defensive startup reset (a prior crash may have left
    /// relays energized) and configures every channel of the pin layout.
    ///
    /// # Errors
    ///
    /// Propagates backend reset/configuration failures.
    pub fn new(mut gpio: G, pins: SorterPins, config: SequencerConfig) -> SequencerResult<Self> {
        gpio.reset()?;
        pins.configure_all(&mut gpio)?;

        Ok(Self {
            gpio,
            pins,
            config,
            tracker: PhaseTracker::new(),
            stop: StopSignal::none(),
        })
    }

    /// Attach an external stop signal (emergency stop, Ctrl-C).
    #[must_use]
    pub fn with_stop(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Current sequence phase.
    #[must_use]
    pub fn phase(&self) -> SequencePhase {
        self.tracker.current()
    }

    /// Pin layout this sequencer drives.
    #[must_use]
    pub fn pins(&self) -> &SorterPins {
        &self.pins
    }

    /// Release the hardware: de-energize everything and clear the channel
    /// configuration. Call exactly once at process shutdown.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn shutdown(mut self) -> SequencerResult<()> {
        self.gpio.reset()?;
        Ok(())
    }

    /// Physically route one card in the given direction.
    ///
    /// Runs to completion or fault before returning; re-entrant only after
    /// the return to `Idle`. On any fault every actuator reads
    /// de-energized before the fault is surfaced, and retry is left to the
    /// caller.
    ///
    /// # Errors
    ///
    /// - [`SequencerFault::ArrivalTimeout`] — no card was fed
    /// - [`SequencerFault::TransitTimeout`] — card jammed at the barrier
    /// - [`SequencerFault::GapTimeout`] — no cycle boundary after clearance
    /// - [`SequencerFault::Cancelled`] — external stop fired
    /// - [`SequencerFault::AlreadyRunning`] — called while mid-sequence
    /// - [`SequencerFault::Gpio`] — the pin layer failed
    pub async fn route_card(&mut self, direction: SortDirection) -> SequencerResult<RouteReport> {
        if self.tracker.current().is_active() {
            return Err(SequencerFault::AlreadyRunning);
        }
        if self.stop.is_stopped() {
            return Err(SequencerFault::Cancelled {
                phase: SequencePhase::Idle,
            });
        }

        self.tracker.clear_history();
        info!(%direction, "routing card");

        match self.run(direction).await {
            Ok(report) => {
                info!(%direction, total_ms = report.total.as_millis() as u64, "card routed");
                Ok(report)
            }
            Err(fault) => {
                // The one safety property that must hold on every exit:
                // nothing stays energized.
                self.release_all();
                self.tracker.abort();
                warn!(%direction, %fault, "routing aborted, actuators released");
                Err(fault)
            }
        }
    }

    async fn run(&mut self, direction: SortDirection) -> SequencerResult<RouteReport> {
        let plan = DirectionPlan::for_direction(direction);
        let started = Instant::now();

        self.advance(SequencePhase::Conveying)?;
        self.write_role(ActuatorRole::Conveyor, true)?;

        self.advance(SequencePhase::AwaitingCard)?;
        self.await_sensor(true, self.config.arrival_timeout).await?;

        self.advance(SequencePhase::Routing)?;
        self.walk_engage(plan.on_arrival()).await?;

        self.advance(SequencePhase::AwaitingClear)?;
        self.await_sensor(false, self.config.transit_timeout).await?;

        self.advance(SequencePhase::AwaitingGap)?;
        self.await_sensor(true, self.config.gap_timeout).await?;

        self.walk_release(plan.on_gap()).await?;

        self.advance(SequencePhase::ConveyorCooldown)?;
        self.hold(self.config.conveyor_cooldown).await?;
        self.write_role(ActuatorRole::Conveyor, false)?;

        self.advance(SequencePhase::Idle)?;

        Ok(RouteReport {
            direction,
            total: started.elapsed(),
            transitions: self.tracker.history().iter().cloned().collect(),
        })
    }

    /// Execute the arrival side of a direction table. The phase stays
    /// `Routing`; holds here are engage offsets, not dwells.
    async fn walk_engage(&mut self, steps: &[PlanStep]) -> SequencerResult<()> {
        for step in steps {
            match step {
                PlanStep::Engage(role) => self.write_role(*role, true)?,
                PlanStep::Release(role) => self.write_role(*role, false)?,
                PlanStep::Hold(duration) => self.hold(*duration).await?,
            }
        }
        Ok(())
    }

    /// Execute the gap side of a direction table, tracking the dwell and
    /// release phases as the steps dictate.
    async fn walk_release(&mut self, steps: &[PlanStep]) -> SequencerResult<()> {
        self.advance(SequencePhase::Dwell)?;
        for step in steps {
            match step {
                PlanStep::Engage(role) => {
                    self.ensure_phase(SequencePhase::Dwell)?;
                    self.write_role(*role, true)?;
                }
                PlanStep::Hold(duration) => {
                    self.ensure_phase(SequencePhase::Dwell)?;
                    self.hold(*duration).await?;
                }
                PlanStep::Release(role) => {
                    self.ensure_phase(SequencePhase::Releasing)?;
                    self.write_role(*role, false)?;
                }
            }
        }
        Ok(())
    }

    fn advance(&mut self, phase: SequencePhase) -> SequencerResult<PhaseTransition> {
        Ok(self.tracker.advance(phase)?)
    }

    fn ensure_phase(&mut self, phase: SequencePhase) -> SequencerResult<()> {
        if self.tracker.current() != phase {
            self.tracker.advance(phase)?;
        }
        Ok(())
    }

    fn write_role(&mut self, role: ActuatorRole, energized: bool) -> SequencerResult<()> {
        let group = self.pins.group(role);
        tracing::debug!(%group, energized, "actuator write");
        self.gpio.write_group(group, energized)?;
        Ok(())
    }

    async fn await_sensor(
        &mut self,
        interrupted: bool,
        timeout: Duration,
    ) -> SequencerResult<Duration> {
        let target = self.pins.sensor_level(interrupted);
        let sensor = self.pins.sensor;
        let poll = self.config.poll_interval;

        match wait_for_level(&self.gpio, sensor, target, timeout, poll, &mut self.stop).await {
            Ok(elapsed) => Ok(elapsed),
            Err(WaitError::Timeout { elapsed }) => Err(self.timeout_fault(elapsed)),
            Err(WaitError::Cancelled) => Err(SequencerFault::Cancelled {
                phase: self.tracker.current(),
            }),
            Err(WaitError::Gpio(e)) => Err(e.into()),
        }
    }

    async fn hold(&mut self, duration: Duration) -> SequencerResult<()> {
        if sleep_cancellable(duration, &mut self.stop).await {
            Ok(())
        } else {
            Err(SequencerFault::Cancelled {
                phase: self.tracker.current(),
            })
        }
    }

    fn timeout_fault(&self, elapsed: Duration) -> SequencerFault {
        match self.tracker.current() {
            SequencePhase::AwaitingCard => SequencerFault::ArrivalTimeout { elapsed },
            SequencePhase::AwaitingClear => SequencerFault::TransitTimeout { elapsed },
            _ => SequencerFault::GapTimeout { elapsed },
        }
    }

    /// Force every actuator to its released state, ignoring individual
    /// write failures: on the abort path a partially failing backend must
    /// not keep the remaining relays energized.
    fn release_all(&mut self) {
        for role in [
            ActuatorRole::Flaps,
            ActuatorRole::MainSort,
            ActuatorRole::Conveyor,
        ] {
            let group = self.pins.group(role).clone();
            if let Err(e) = self.gpio.write_group(&group, false) {
                warn!(%group, error = %e, "release failed during abort");
            }
        }
    }
}

/// Cloneable wrapper that serializes access to one sequencer.
///
/// Both physical directions contend for the same relays, so two routing
/// calls must never interleave. `route_card` queues behind the lock;
/// `try_route_card` refuses to queue and surfaces
/// [`SequencerFault::AlreadyRunning`] with no hardware side effect.
#[derive(Debug)]
pub struct SharedSequencer<G: GpioBackend> {
    inner: Arc<tokio::sync::Mutex<SortSequencer<G>>>,
}

impl<G: GpioBackend> Clone for SharedSequencer<G> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<G: GpioBackend> SharedSequencer<G> {
    /// Wrap a sequencer for shared use.
    pub fn new(sequencer: SortSequencer<G>) -> Self {
        Self {
            inner: Arc::new(tokio::sync::Mutex::new(sequencer)),
        }
    }

    /// Route a card, waiting for any in-flight sequence to finish first.
    ///
    /// # Errors
    /// Same faults as [`SortSequencer::route_card`].
    pub async fn route_card(&self, direction: SortDirection) -> SequencerResult<RouteReport> {
        self.inner.lock().await.route_card(direction).await
    }

    /// Route a card only if no sequence is in flight.
    ///
    /// # Errors
    /// [`SequencerFault::AlreadyRunning`] if another caller holds the
    /// sequencer; otherwise the same faults as
    /// [`SortSequencer::route_card`].
    pub async fn try_route_card(&self, direction: SortDirection) -> SequencerResult<RouteReport> {
        match self.inner.try_lock() {
            Ok(mut sequencer) => sequencer.route_card(direction).await,
            Err(_) => Err(SequencerFault::AlreadyRunning),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardsort_gpio::{ActiveLevel, LogicLevel, MemoryGpio, MemoryGpioHandle};

    fn build_sequencer() -> (SortSequencer<MemoryGpio>, MemoryGpioHandle) {
        let (gpio, handle) = MemoryGpio::new();
        let pins = SorterPins::default_layout(ActiveLevel::ActiveHigh).unwrap();
        let sequencer = SortSequencer::new(gpio, pins, SequencerConfig::default()).unwrap();
        (sequencer, handle)
    }

    #[tokio::test]
    async fn test_new_sequencer_configures_pins_released() {
        let (sequencer, handle) = build_sequencer();
        assert_eq!(sequencer.phase(), SequencePhase::Idle);
        assert_eq!(handle.configured_count(), 5);
        assert!(handle.all_outputs_released());
    }

    #[tokio::test(start_paused = true)]
    async fn test_route_rejected_when_stop_already_raised() {
        let (sequencer, handle) = build_sequencer();
        let (controller, stop) = crate::stop::StopController::new();
        let mut sequencer = sequencer.with_stop(stop);
        controller.stop();

        let result = sequencer.route_card(SortDirection::Left).await;
        assert!(matches!(result, Err(SequencerFault::Cancelled { .. })));
        // Nothing was energized for a pre-cancelled call.
        assert!(handle.all_outputs_released());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_sequencer_rejects_concurrent_entry() {
        let (sequencer, handle) = build_sequencer();
        let sensor = sequencer.pins().sensor;
        let shared = SharedSequencer::new(sequencer);

        let busy = shared.clone();
        let script = handle.clone();
        let first = tokio::spawn(async move {
            busy.route_card(SortDirection::Right).await
        });

        // Give the first call time to take the lock and start conveying.
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = shared.try_route_card(SortDirection::Left).await;
        assert!(matches!(second, Err(SequencerFault::AlreadyRunning)));

        // Let the first card through so the task completes.
        tokio::time::sleep(Duration::from_millis(20)).await;
        script.set_input_level(sensor, LogicLevel::High).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        script.set_input_level(sensor, LogicLevel::Low).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        script.set_input_level(sensor, LogicLevel::High).unwrap();

        let report = first.await.unwrap().unwrap();
        assert_eq!(report.direction, SortDirection::Right);
        assert!(handle.all_outputs_released());
    }

    #[tokio::test]
    async fn test_shutdown_clears_configuration() {
        let (sequencer, handle) = build_sequencer();
        sequencer.shutdown().unwrap();
        assert_eq!(handle.configured_count(), 0);
        assert!(handle.all_outputs_released());
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = SequencerConfig::default()
            .with_arrival_timeout(Duration::from_secs(2))
            .with_poll_interval(Duration::from_millis(5));

        assert_eq!(config.arrival_timeout, Duration::from_secs(2));
        assert_eq!(config.poll_interval, Duration::from_millis(5));
        assert_eq!(
            config.conveyor_cooldown,
            Duration::from_millis(CONVEYOR_COOLDOWN_MS)
        );
    }
}
