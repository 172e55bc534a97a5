//! Cooperative cancellation for the actuation path.
//!
//! A [`StopController`] is held by the orchestration layer (wired to an
//! emergency stop or Ctrl-C); the sequencer holds the matching
//! [`StopSignal`] and checks it at every sensor poll iteration and inside
//! every fixed delay. Fixed delays therefore interrupt within one sleep
//! granularity rather than running to completion.

use std::time::Duration;
use tokio::sync::watch;

/// Sending half of the stop signal.
#[derive(Debug)]
pub struct StopController {
    tx: watch::Sender<bool>,
}

impl StopController {
    /// Create a controller/signal pair.
    pub fn new() -> (Self, StopSignal) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, StopSignal { rx })
    }

    /// Raise the stop signal.
    ///
    /// Every watcher wakes immediately; the signal is latched and cannot
    /// be lowered again.
    pub fn stop(&self) {
        let _ = self.tx.send(true);
    }

    /// Whether the stop signal has been raised.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Receiving half of the stop signal.
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    /// A signal that never fires, for callers without an external stop.
    #[must_use]
    pub fn none() -> Self {
        let (_, signal) = StopController::new();
        // The controller is dropped here; `cancelled()` pends forever.
        signal
    }

    /// Whether the stop signal has been raised.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the stop signal is raised.
    ///
    /// If the controller has been dropped without stopping, this pends
    /// forever — a dropped controller is "no stop will ever come", not a
    /// cancellation.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Sleep for `duration` unless the stop signal fires first.
///
/// Returns `true` if the full duration elapsed, `false` if the sleep was
/// interrupted by the stop signal.
pub async fn sleep_cancellable(duration: Duration, stop: &mut StopSignal) -> bool {
    if stop.is_stopped() {
        return false;
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        _ = stop.cancelled() => false,
    }
}
