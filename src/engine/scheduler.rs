//! One-second clock that drives [`TimerEngine::tick`].
//!
//! The scheduler keeps at most one tokio task alive. Each task is bound to the
//! engine epoch it was spawned for; once the engine stops or moves to another
//! epoch the task discards its pending tick and exits.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::debug;

use super::timer::{TickOutcome, TimerEngine};

/// Interval between ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// The tick task currently driving the engine.
struct ActiveTicker {
    epoch: u64,
    handle: JoinHandle<()>,
}

/// Owns the single tick source for a [`TimerEngine`].
pub struct TickScheduler {
    period: Duration,
    active: Option<ActiveTicker>,
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TickScheduler {
    /// Creates a scheduler ticking once per second.
    pub fn new() -> Self {
        Self::with_period(TICK_PERIOD)
    }

    /// Creates a scheduler with a custom tick period.
    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            active: None,
        }
    }

    /// Makes sure exactly one task is ticking `engine` for `epoch`.
    ///
    /// Returns `false` if a live task for the same epoch already exists.
    /// Otherwise any previous task is aborted before the new one is spawned.
    /// Must be called from within a tokio runtime.
    pub fn ensure_running(&mut self, engine: &Arc<Mutex<TimerEngine>>, epoch: u64) -> bool {
        if let Some(active) = &self.active {
            if active.epoch == epoch && !active.handle.is_finished() {
                return false;
            }
        }

        self.stop();
        let handle = tokio::spawn(drive(Arc::clone(engine), epoch, self.period));
        self.active = Some(ActiveTicker { epoch, handle });
        debug!(epoch, "Tick source started");
        true
    }

    /// Aborts the tick task, if any.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.handle.abort();
            debug!(epoch = active.epoch, "Tick source stopped");
        }
    }

    /// Returns true while a tick task is alive.
    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.handle.is_finished())
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ticks the engine every `period` until the engine leaves `epoch`.
async fn drive(engine: Arc<Mutex<TimerEngine>>, epoch: u64, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let mut engine = engine.lock().await;
        if !engine.is_running() || engine.epoch() != epoch {
            debug!(epoch, "Discarding stale tick");
            break;
        }

        if let TickOutcome::PhaseCompleted { .. } = engine.tick() {
            break;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
