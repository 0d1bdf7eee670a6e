//! Timer engine for the Pomodoro timer.
//!
//! This module provides the countdown state machine:
//! - Focus ⇄ Break phase transitions
//! - Progress angle for circular visual feedback
//! - Event firing for sounds and title updates
//!
//! The engine owns no clock. Something else (normally
//! [`TickScheduler`](super::scheduler::TickScheduler)) calls [`TimerEngine::tick`]
//! once per elapsed second while the engine is running.

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::error::EngineError;
use crate::types::{ApplyTo, Phase, TimerConfiguration, TimerSnapshot};

/// One full turn of the progress ring.
const FULL_TURN_DEGREES: f64 = 360.0;

// ============================================================================
// TimerEvent
// ============================================================================

/// Timer events for sounds, title updates and other observers.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerEvent {
    /// Countdown started or resumed
    Started {
        /// Phase being counted down
        phase: Phase,
        /// Seconds left when the countdown started
        remaining_seconds: u32,
    },
    /// Countdown paused
    Paused {
        /// Phase that was paused
        phase: Phase,
        /// Seconds left at the moment of pausing
        remaining_seconds: u32,
    },
    /// One second elapsed
    Tick {
        /// Phase being counted down
        phase: Phase,
        /// Remaining seconds after the tick
        remaining_seconds: u32,
    },
    /// A phase ran down to zero and the engine switched to the next one
    PhaseCompleted {
        /// Phase that is now loaded (stopped)
        next_phase: Phase,
    },
    /// The user skipped ahead to the next phase
    Skipped {
        /// Phase that is now loaded (stopped)
        next_phase: Phase,
    },
    /// The engine went back to a fresh focus phase
    Reset,
    /// Phase durations changed
    Configured {
        /// New configuration
        configuration: TimerConfiguration,
    },
}

// ============================================================================
// TickOutcome
// ============================================================================

/// What a single call to [`TimerEngine::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The engine was stopped; the tick was discarded.
    Ignored,
    /// One second was counted down.
    Counted {
        /// Remaining seconds after the tick
        remaining_seconds: u32,
    },
    /// The phase ran out and the engine stopped at the boundary.
    PhaseCompleted {
        /// Phase that is now loaded
        next_phase: Phase,
    },
}

// ============================================================================
// TimerState
// ============================================================================

/// Mutable countdown state, only touched through [`TimerEngine`].
#[derive(Debug, Clone)]
struct TimerState {
    phase: Phase,
    remaining_seconds: u32,
    running: bool,
    progress_angle_degrees: f64,
    /// Length of the current phase, fixed when the phase was loaded.
    phase_total_seconds: u32,
    /// Bumped whenever a running stretch begins or ends.
    epoch: u64,
}

impl TimerState {
    fn new(config: &TimerConfiguration) -> Self {
        Self {
            phase: Phase::Focus,
            remaining_seconds: config.focus_seconds,
            running: false,
            progress_angle_degrees: 0.0,
            phase_total_seconds: config.focus_seconds,
            epoch: 0,
        }
    }

    /// Loads `phase` stopped at its full configured duration.
    fn load_phase(&mut self, phase: Phase, config: &TimerConfiguration) {
        let duration = config.duration_of(phase);
        self.phase = phase;
        self.remaining_seconds = duration;
        self.phase_total_seconds = duration;
        self.progress_angle_degrees = 0.0;
        self.running = false;
        self.bump_epoch();
    }

    fn advance_progress(&mut self) {
        let step = FULL_TURN_DEGREES / f64::from(self.phase_total_seconds.max(1));
        let next = self.progress_angle_degrees + step;
        self.progress_angle_degrees = if next >= FULL_TURN_DEGREES { 0.0 } else { next };
    }

    fn bump_epoch(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Timer engine that manages the countdown state and emits events.
pub struct TimerEngine {
    /// Current countdown state
    state: TimerState,
    /// Active phase durations
    config: TimerConfiguration,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerEngine {
    /// Creates a stopped engine loaded with a full focus phase.
    pub fn new(config: TimerConfiguration, event_tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self {
            state: TimerState::new(&config),
            config,
            event_tx,
        }
    }

    /// Starts (or resumes) the countdown of the current phase.
    ///
    /// Returns `false` without doing anything if the engine is already running.
    pub fn start(&mut self) -> bool {
        if self.state.running {
            return false;
        }

        self.state.running = true;
        self.state.bump_epoch();
        debug!(phase = %self.state.phase, remaining = self.state.remaining_seconds, "Timer started");

        self.emit(TimerEvent::Started {
            phase: self.state.phase,
            remaining_seconds: self.state.remaining_seconds,
        });
        true
    }

    /// Pauses the countdown, keeping the remaining time and progress.
    ///
    /// Returns `false` without doing anything if the engine is already stopped.
    pub fn pause(&mut self) -> bool {
        if !self.state.running {
            return false;
        }

        self.state.running = false;
        self.state.bump_epoch();
        debug!(phase = %self.state.phase, remaining = self.state.remaining_seconds, "Timer paused");

        self.emit(TimerEvent::Paused {
            phase: self.state.phase,
            remaining_seconds: self.state.remaining_seconds,
        });
        true
    }

    /// Advances the countdown by one second.
    ///
    /// Ticks arriving while the engine is stopped are discarded. When the
    /// remaining time reaches zero the engine loads the next phase with its
    /// currently configured duration, stops, and emits
    /// [`TimerEvent::PhaseCompleted`].
    pub fn tick(&mut self) -> TickOutcome {
        if !self.state.running {
            debug!("Discarding tick while stopped");
            return TickOutcome::Ignored;
        }

        if self.state.remaining_seconds > 0 {
            self.state.remaining_seconds -= 1;
            self.state.advance_progress();
        }

        if self.state.remaining_seconds == 0 {
            return self.handle_phase_complete();
        }

        self.emit(TimerEvent::Tick {
            phase: self.state.phase,
            remaining_seconds: self.state.remaining_seconds,
        });
        TickOutcome::Counted {
            remaining_seconds: self.state.remaining_seconds,
        }
    }

    /// Handles natural phase completion.
    fn handle_phase_complete(&mut self) -> TickOutcome {
        let next_phase = self.state.phase.next();
        self.state.load_phase(next_phase, &self.config);
        info!(next = %next_phase, "Phase completed");

        self.emit(TimerEvent::PhaseCompleted { next_phase });
        TickOutcome::PhaseCompleted { next_phase }
    }

    /// Stops the timer and loads a full focus phase.
    ///
    /// The configuration is left untouched.
    pub fn reset(&mut self) {
        self.state.load_phase(Phase::Focus, &self.config);
        debug!("Timer reset");
        self.emit(TimerEvent::Reset);
    }

    /// Jumps to the next phase without finishing the current one.
    ///
    /// The engine stops. This is not a natural completion, so
    /// [`TimerEvent::Skipped`] is emitted instead of `PhaseCompleted`.
    pub fn skip(&mut self) {
        let next_phase = self.state.phase.next();
        self.state.load_phase(next_phase, &self.config);
        debug!(next = %next_phase, "Phase skipped");
        self.emit(TimerEvent::Skipped { next_phase });
    }

    /// Changes the phase durations, effective from the next phase switch.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidDuration` if either duration is zero; the
    /// previous configuration stays in place.
    pub fn configure(&mut self, focus_seconds: u32, break_seconds: u32) -> Result<(), EngineError> {
        self.configure_with(
            TimerConfiguration {
                focus_seconds,
                break_seconds,
            },
            ApplyTo::NextPhase,
        )
    }

    /// Changes the phase durations with an explicit policy for the current phase.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidDuration` if either duration is zero.
    pub fn configure_with(
        &mut self,
        config: TimerConfiguration,
        apply_to: ApplyTo,
    ) -> Result<(), EngineError> {
        config.validate()?;

        self.config = config;
        if apply_to == ApplyTo::CurrentPhase {
            let phase = self.state.phase;
            self.state.load_phase(phase, &self.config);
        }
        debug!(
            focus_seconds = config.focus_seconds,
            break_seconds = config.break_seconds,
            ?apply_to,
            "Timer configured"
        );

        self.emit(TimerEvent::Configured {
            configuration: config,
        });
        Ok(())
    }

    /// Returns the current phase.
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Returns the seconds left in the current phase.
    pub fn remaining_seconds(&self) -> u32 {
        self.state.remaining_seconds
    }

    /// Returns true if the countdown is advancing.
    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Returns the progress angle in degrees, always in `[0, 360)`.
    pub fn progress_angle_degrees(&self) -> f64 {
        self.state.progress_angle_degrees
    }

    /// Returns the active configuration.
    pub fn configuration(&self) -> TimerConfiguration {
        self.config
    }

    /// Returns the identifier of the current running stretch.
    ///
    /// Any start, pause, reset, skip, phase completion or current-phase
    /// reconfiguration changes it, so a clock that captured the epoch when
    /// it was started can tell that its ticks have gone stale.
    pub fn epoch(&self) -> u64 {
        self.state.epoch
    }

    /// Returns a read-only copy of the state.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.state.phase,
            remaining_seconds: self.state.remaining_seconds,
            running: self.state.running,
            progress_angle_degrees: self.state.progress_angle_degrees,
            configuration: self.config,
        }
    }

    fn emit(&self, event: TimerEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("Timer event receiver dropped; event discarded");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_engine(
        focus: u32,
        brk: u32,
    ) -> (TimerEngine, mpsc::UnboundedReceiver<TimerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let config = TimerConfiguration::new(focus, brk).unwrap();
        (TimerEngine::new(config, tx), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<TimerEvent>) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn completions(events: &[TimerEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, TimerEvent::PhaseCompleted { .. }))
            .count()
    }

    // ------------------------------------------------------------------------
    // Basic transitions
    // ------------------------------------------------------------------------

    mod transition_tests {
        use super::*;

        #[test]
        fn test_initial_state() {
            let (engine, _rx) = create_engine(3600, 300);

            assert_eq!(engine.phase(), Phase::Focus);
            assert_eq!(engine.remaining_seconds(), 3600);
            assert!(!engine.is_running());
            assert_eq!(engine.progress_angle_degrees(), 0.0);
        }

        #[test]
        fn test_start() {
            let (mut engine, mut rx) = create_engine(60, 30);

            assert!(engine.start());
            assert!(engine.is_running());
            assert_eq!(engine.phase(), Phase::Focus);

            let event = rx.try_recv().unwrap();
            assert_eq!(
                event,
                TimerEvent::Started {
                    phase: Phase::Focus,
                    remaining_seconds: 60
                }
            );
        }

        #[test]
        fn test_start_when_running_is_noop() {
            let (mut engine, mut rx) = create_engine(60, 30);
            engine.start();
            let epoch = engine.epoch();
            let _ = drain(&mut rx);

            assert!(!engine.start());
            assert_eq!(engine.epoch(), epoch);
            assert!(rx.try_recv().is_err());
        }

        #[test]
        fn test_pause() {
            let (mut engine, mut rx) = create_engine(60, 30);
            engine.start();
            engine.tick();
            let _ = drain(&mut rx);

            assert!(engine.pause());
            assert!(!engine.is_running());
            assert_eq!(
                rx.try_recv().unwrap(),
                TimerEvent::Paused {
                    phase: Phase::Focus,
                    remaining_seconds: 59
                }
            );
        }

        #[test]
        fn test_pause_when_stopped_is_noop() {
            let (mut engine, mut rx) = create_engine(60, 30);

            assert!(!engine.pause());
            assert!(rx.try_recv().is_err());
        }

        #[test]
        fn test_pause_then_ticks_change_nothing() {
            let (mut engine, _rx) = create_engine(90, 30);
            engine.start();
            for _ in 0..10 {
                engine.tick();
            }
            engine.pause();
            let remaining = engine.remaining_seconds();
            let angle = engine.progress_angle_degrees();

            for _ in 0..25 {
                assert_eq!(engine.tick(), TickOutcome::Ignored);
            }

            assert_eq!(engine.remaining_seconds(), remaining);
            assert_eq!(engine.progress_angle_degrees(), angle);
        }

        #[test]
        fn test_resume_after_pause_keeps_progress() {
            let (mut engine, _rx) = create_engine(60, 30);
            engine.start();
            engine.tick();
            engine.tick();
            engine.pause();
            engine.start();

            assert_eq!(engine.remaining_seconds(), 58);
            assert_eq!(engine.progress_angle_degrees(), 12.0);
            assert_eq!(
                engine.tick(),
                TickOutcome::Counted {
                    remaining_seconds: 57
                }
            );
        }

        #[test]
        fn test_reset_from_running_break() {
            let (mut engine, mut rx) = create_engine(4, 2);
            engine.skip();
            engine.start();
            engine.tick();
            let _ = drain(&mut rx);

            engine.reset();

            assert_eq!(engine.phase(), Phase::Focus);
            assert!(!engine.is_running());
            assert_eq!(engine.remaining_seconds(), 4);
            assert_eq!(engine.progress_angle_degrees(), 0.0);
            assert_eq!(rx.try_recv().unwrap(), TimerEvent::Reset);
        }

        #[test]
        fn test_reset_uses_configured_focus_duration() {
            let (mut engine, _rx) = create_engine(3600, 300);
            engine.configure(1500, 300).unwrap();

            engine.reset();

            assert_eq!(engine.remaining_seconds(), 1500);
            assert_eq!(engine.configuration().focus_seconds, 1500);
        }

        #[test]
        fn test_skip_flips_phase_and_stops() {
            let (mut engine, mut rx) = create_engine(60, 30);
            engine.start();
            engine.tick();
            let _ = drain(&mut rx);

            engine.skip();

            assert_eq!(engine.phase(), Phase::Break);
            assert_eq!(engine.remaining_seconds(), 30);
            assert!(!engine.is_running());
            assert_eq!(engine.progress_angle_degrees(), 0.0);

            let events = drain(&mut rx);
            assert_eq!(
                events,
                vec![TimerEvent::Skipped {
                    next_phase: Phase::Break
                }]
            );
        }

        #[test]
        fn test_skip_never_emits_phase_completed() {
            let (mut engine, mut rx) = create_engine(5, 5);
            for _ in 0..6 {
                engine.start();
                engine.skip();
            }

            let events = drain(&mut rx);
            assert_eq!(completions(&events), 0);
            assert!(!engine.is_running());
            assert_eq!(engine.phase(), Phase::Focus);
        }
    }

    // ------------------------------------------------------------------------
    // Ticking and completion
    // ------------------------------------------------------------------------

    mod tick_tests {
        use super::*;

        #[test]
        fn test_tick_when_stopped_is_ignored() {
            let (mut engine, mut rx) = create_engine(60, 30);

            assert_eq!(engine.tick(), TickOutcome::Ignored);
            assert_eq!(engine.remaining_seconds(), 60);
            assert!(rx.try_recv().is_err());
        }

        #[test]
        fn test_tick_counts_down_and_emits() {
            let (mut engine, mut rx) = create_engine(60, 30);
            engine.start();
            let _ = drain(&mut rx);

            assert_eq!(
                engine.tick(),
                TickOutcome::Counted {
                    remaining_seconds: 59
                }
            );
            assert_eq!(
                rx.try_recv().unwrap(),
                TimerEvent::Tick {
                    phase: Phase::Focus,
                    remaining_seconds: 59
                }
            );
        }

        #[test]
        fn test_focus_then_break_scenario() {
            let (mut engine, mut rx) = create_engine(4, 2);

            engine.start();
            for _ in 0..4 {
                engine.tick();
            }
            assert_eq!(engine.phase(), Phase::Break);
            assert_eq!(engine.remaining_seconds(), 2);
            assert!(!engine.is_running());
            let events = drain(&mut rx);
            assert_eq!(completions(&events), 1);
            assert!(events.contains(&TimerEvent::PhaseCompleted {
                next_phase: Phase::Break
            }));

            engine.start();
            for _ in 0..2 {
                engine.tick();
            }
            assert_eq!(engine.phase(), Phase::Focus);
            assert_eq!(engine.remaining_seconds(), 4);
            assert!(!engine.is_running());
            let events = drain(&mut rx);
            assert_eq!(completions(&events), 1);
            assert!(events.contains(&TimerEvent::PhaseCompleted {
                next_phase: Phase::Focus
            }));
        }

        #[test]
        fn test_exactly_one_completion_for_any_duration() {
            for duration in [1, 2, 3, 7, 13, 59, 60, 61, 360, 1000] {
                let (mut engine, mut rx) = create_engine(duration, 9);
                engine.start();
                for _ in 0..duration {
                    engine.tick();
                }

                let events = drain(&mut rx);
                assert_eq!(completions(&events), 1, "duration {}", duration);
                assert_eq!(engine.remaining_seconds(), 9, "duration {}", duration);
                assert_eq!(engine.phase(), Phase::Break);
            }
        }

        #[test]
        fn test_ticks_after_completion_are_ignored() {
            let (mut engine, mut rx) = create_engine(2, 2);
            engine.start();
            engine.tick();
            engine.tick();
            let _ = drain(&mut rx);

            assert_eq!(engine.tick(), TickOutcome::Ignored);
            assert_eq!(engine.remaining_seconds(), 2);
            assert!(rx.try_recv().is_err());
        }

        #[test]
        fn test_completion_bumps_epoch() {
            let (mut engine, _rx) = create_engine(1, 1);
            engine.start();
            let epoch = engine.epoch();

            assert_eq!(
                engine.tick(),
                TickOutcome::PhaseCompleted {
                    next_phase: Phase::Break
                }
            );
            assert_ne!(engine.epoch(), epoch);
        }

        #[test]
        fn test_dropped_receiver_does_not_stall_engine() {
            let (mut engine, rx) = create_engine(2, 1);
            drop(rx);

            engine.start();
            engine.tick();
            engine.tick();

            assert_eq!(engine.phase(), Phase::Break);
            assert_eq!(engine.remaining_seconds(), 1);
        }
    }

    // ------------------------------------------------------------------------
    // Progress angle
    // ------------------------------------------------------------------------

    mod progress_tests {
        use super::*;

        #[test]
        fn test_progress_advances_by_phase_total() {
            let (mut engine, _rx) = create_engine(90, 30);
            engine.start();

            engine.tick();
            assert_eq!(engine.progress_angle_degrees(), 4.0);
            engine.tick();
            assert_eq!(engine.progress_angle_degrees(), 8.0);
        }

        #[test]
        fn test_progress_in_range_for_uneven_durations() {
            for duration in [7, 11, 13, 17, 359, 361, 700, 1234] {
                let (mut engine, _rx) = create_engine(duration, duration + 3);
                for _ in 0..3 {
                    engine.start();
                    for _ in 0..(duration + 5) {
                        engine.tick();
                        let angle = engine.progress_angle_degrees();
                        assert!(
                            (0.0..360.0).contains(&angle),
                            "angle {} out of range for duration {}",
                            angle,
                            duration
                        );
                    }
                }
            }
        }

        #[test]
        fn test_progress_wraps_against_post_increment_value() {
            // 360 / 7 never lands exactly on 360.
            let (mut engine, _rx) = create_engine(7, 7);
            engine.start();
            for _ in 0..6 {
                engine.tick();
            }
            let angle = engine.progress_angle_degrees();
            assert!(angle > 300.0 && angle < 360.0);
        }

        #[test]
        fn test_progress_step_uses_length_fixed_at_phase_start() {
            let (mut engine, _rx) = create_engine(360, 60);
            engine.start();
            engine.tick();
            engine.configure(36, 60).unwrap();
            engine.tick();

            assert_eq!(engine.progress_angle_degrees(), 2.0);
        }

        #[test]
        fn test_progress_zero_after_completion() {
            let (mut engine, _rx) = create_engine(3, 3);
            engine.start();
            for _ in 0..3 {
                engine.tick();
            }
            assert_eq!(engine.progress_angle_degrees(), 0.0);
        }
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    mod configure_tests {
        use super::*;

        #[test]
        fn test_configure_rejects_zero_and_keeps_previous() {
            let (mut engine, mut rx) = create_engine(3600, 300);

            let result = engine.configure(0, 300);

            assert_eq!(
                result,
                Err(EngineError::InvalidDuration {
                    phase: Phase::Focus,
                    seconds: 0
                })
            );
            assert_eq!(engine.configuration(), TimerConfiguration::default());
            assert!(rx.try_recv().is_err());
        }

        #[test]
        fn test_configure_emits_event() {
            let (mut engine, mut rx) = create_engine(3600, 300);

            engine.configure(1500, 600).unwrap();

            assert_eq!(
                rx.try_recv().unwrap(),
                TimerEvent::Configured {
                    configuration: TimerConfiguration {
                        focus_seconds: 1500,
                        break_seconds: 600
                    }
                }
            );
        }

        #[test]
        fn test_configure_mid_focus_applies_from_following_focus() {
            let (mut engine, mut rx) = create_engine(300, 300);
            engine.start();
            for _ in 0..100 {
                engine.tick();
            }
            assert_eq!(engine.remaining_seconds(), 200);

            engine.configure(600, 300).unwrap();
            assert_eq!(engine.remaining_seconds(), 200);
            assert!(engine.is_running());

            for _ in 0..200 {
                engine.tick();
            }
            assert_eq!(engine.phase(), Phase::Break);
            assert_eq!(engine.remaining_seconds(), 300);

            engine.start();
            for _ in 0..300 {
                engine.tick();
            }
            assert_eq!(engine.phase(), Phase::Focus);
            assert_eq!(engine.remaining_seconds(), 600);

            let events = drain(&mut rx);
            assert_eq!(completions(&events), 2);
        }

        #[test]
        fn test_configure_current_phase_restarts_it() {
            let (mut engine, _rx) = create_engine(300, 60);
            engine.start();
            for _ in 0..10 {
                engine.tick();
            }

            engine
                .configure_with(TimerConfiguration::new(120, 60).unwrap(), ApplyTo::CurrentPhase)
                .unwrap();

            assert_eq!(engine.phase(), Phase::Focus);
            assert_eq!(engine.remaining_seconds(), 120);
            assert!(!engine.is_running());
            assert_eq!(engine.progress_angle_degrees(), 0.0);
        }

        #[test]
        fn test_snapshot_reflects_state() {
            let (mut engine, _rx) = create_engine(10, 5);
            engine.start();
            engine.tick();

            let snapshot = engine.snapshot();
            assert_eq!(snapshot.phase, Phase::Focus);
            assert_eq!(snapshot.remaining_seconds, 9);
            assert!(snapshot.running);
            assert_eq!(snapshot.progress_angle_degrees, 36.0);
            assert_eq!(snapshot.configuration.break_seconds, 5);
        }
    }
}
