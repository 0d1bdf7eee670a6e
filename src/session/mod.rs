//! Session wiring for the Pomodoro timer.
//!
//! A [`Session`] owns one [`TimerEngine`] together with the clock that drives
//! it, the persisted preferences and the notification catalog. Control calls
//! go to the engine first and then bring the [`TickScheduler`] in line with
//! the engine's running state, so there is never more than one tick source.
//!
//! Events produced by the engine are delivered on the channel passed to
//! [`Session::open`]; feed each one back through [`Session::handle_event`] to
//! get the title to show and to play the completion sound.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::cli::display::{phase_title, window_title};
use crate::engine::{EngineError, TickScheduler, TimerEngine, TimerEvent};
use crate::preferences::{BackgroundImageSet, ImagePosition, PreferenceError, Preferences};
use crate::sound::{
    NotificationCatalog, NotificationSoundSelection, SoundEntry, SoundError, SoundPlayer,
};
use crate::types::{ApplyTo, Phase, Theme, TimerConfiguration, TimerSnapshot};

/// One running instance of the timer with its preferences.
pub struct Session {
    engine: Arc<Mutex<TimerEngine>>,
    scheduler: TickScheduler,
    preferences: Preferences,
    catalog: NotificationCatalog,
    selection: NotificationSoundSelection,
    theme: Theme,
}

impl Session {
    /// Loads durations, sound choice and theme from `preferences` and builds a
    /// stopped engine at the start of a focus phase.
    pub fn open(
        preferences: Preferences,
        catalog: NotificationCatalog,
        event_tx: mpsc::UnboundedSender<TimerEvent>,
    ) -> Self {
        let config = preferences.timer_configuration();
        let selection = preferences.sound_selection();
        let theme = preferences.theme();
        info!(
            focus_seconds = config.focus_seconds,
            break_seconds = config.break_seconds,
            theme = theme.as_str(),
            "Session opened"
        );

        Self {
            engine: Arc::new(Mutex::new(TimerEngine::new(config, event_tx))),
            scheduler: TickScheduler::new(),
            preferences,
            catalog,
            selection,
            theme,
        }
    }

    /// Replaces the tick scheduler (e.g. with a faster period).
    pub fn with_scheduler(mut self, scheduler: TickScheduler) -> Self {
        self.scheduler.stop();
        self.scheduler = scheduler;
        self
    }

    /// Returns the shared engine.
    pub fn engine(&self) -> &Arc<Mutex<TimerEngine>> {
        &self.engine
    }

    /// Returns a copy of the engine state.
    pub async fn snapshot(&self) -> TimerSnapshot {
        self.engine.lock().await.snapshot()
    }

    /// Returns true while a tick task is driving the engine.
    pub fn is_ticking(&self) -> bool {
        self.scheduler.is_active()
    }

    // ------------------------------------------------------------------------
    // Timer control
    // ------------------------------------------------------------------------

    /// Starts the countdown. Returns `false` if it was already running.
    pub async fn start(&mut self) -> bool {
        let (started, running, epoch) = {
            let mut engine = self.engine.lock().await;
            let started = engine.start();
            (started, engine.is_running(), engine.epoch())
        };
        self.sync_scheduler(running, epoch);
        started
    }

    /// Pauses the countdown. Returns `false` if it was already stopped.
    pub async fn pause(&mut self) -> bool {
        let (paused, running, epoch) = {
            let mut engine = self.engine.lock().await;
            let paused = engine.pause();
            (paused, engine.is_running(), engine.epoch())
        };
        self.sync_scheduler(running, epoch);
        paused
    }

    /// Starts when stopped, pauses when running. Returns the new running state.
    pub async fn toggle(&mut self) -> bool {
        let running = self.engine.lock().await.is_running();
        if running {
            self.pause().await;
            false
        } else {
            self.start().await;
            true
        }
    }

    /// Stops and loads a full focus phase.
    pub async fn reset(&mut self) {
        self.engine.lock().await.reset();
        self.scheduler.stop();
    }

    /// Stops and jumps to the next phase.
    pub async fn skip(&mut self) {
        self.engine.lock().await.skip();
        self.scheduler.stop();
    }

    /// Applies new durations to the engine, then persists them.
    ///
    /// A failure to persist is logged; the engine keeps the new durations.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidDuration` if either duration is zero.
    /// Nothing is applied or persisted in that case.
    pub async fn configure(
        &mut self,
        config: TimerConfiguration,
        apply_to: ApplyTo,
    ) -> Result<(), EngineError> {
        let (running, epoch) = {
            let mut engine = self.engine.lock().await;
            engine.configure_with(config, apply_to)?;
            (engine.is_running(), engine.epoch())
        };
        self.sync_scheduler(running, epoch);

        if let Err(e) = self.preferences.set_timer_configuration(&config) {
            warn!("Timer durations were applied but not saved: {}", e);
        }
        Ok(())
    }

    fn sync_scheduler(&mut self, running: bool, epoch: u64) {
        if running {
            self.scheduler.ensure_running(&self.engine, epoch);
        } else {
            self.scheduler.stop();
        }
    }

    // ------------------------------------------------------------------------
    // Notification sound
    // ------------------------------------------------------------------------

    /// Returns the notification catalog.
    pub fn catalog(&self) -> &NotificationCatalog {
        &self.catalog
    }

    /// Returns the current sound choice.
    pub fn sound_selection(&self) -> &NotificationSoundSelection {
        &self.selection
    }

    /// Selects the catalog entry called `name` and persists the choice.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::MissingResource` if no entry has that name; the
    /// previous choice is kept.
    pub fn select_sound(&mut self, name: &str) -> Result<SoundEntry, SoundError> {
        let entry = self
            .catalog
            .find_by_name(name)
            .cloned()
            .ok_or_else(|| SoundError::MissingResource(name.to_string()))?;

        if let Err(e) = self.preferences.set_sound_selection(Some(&entry.reference)) {
            warn!("Notification sound was selected but not saved: {}", e);
        }
        self.selection = NotificationSoundSelection::Selected(entry.reference.clone());
        debug!(sound = %entry.reference, "Notification sound selected");
        Ok(entry)
    }

    /// Chooses no notification sound and persists the choice.
    pub fn clear_sound(&mut self) {
        if let Err(e) = self.preferences.set_sound_selection(None) {
            warn!("Notification sound was cleared but not saved: {}", e);
        }
        self.selection = NotificationSoundSelection::None;
    }

    /// Returns the catalog entry of the current choice, if it still exists.
    pub fn selected_entry(&self) -> Option<&SoundEntry> {
        self.selection
            .reference()
            .and_then(|reference| self.catalog.find(reference))
    }

    // ------------------------------------------------------------------------
    // Theme and images
    // ------------------------------------------------------------------------

    /// Returns the current theme.
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Sets and persists the theme.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        if let Err(e) = self.preferences.set_theme(theme) {
            warn!("Theme was changed but not saved: {}", e);
        }
    }

    /// Switches between light and dark and returns the new theme.
    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.theme.toggled();
        self.set_theme(theme);
        theme
    }

    /// Returns the stored background images.
    pub fn background_images(&self) -> BackgroundImageSet {
        self.preferences.background_images()
    }

    /// Stores or clears one background image and returns the updated set.
    ///
    /// # Errors
    ///
    /// Returns `PreferenceError::InvalidImage` if `uri` is not an image data
    /// URI. Storage failures are logged and the in-session value is returned.
    pub fn set_background_image(
        &self,
        position: ImagePosition,
        uri: Option<String>,
    ) -> Result<BackgroundImageSet, PreferenceError> {
        match self.preferences.set_background_image(position, uri) {
            Ok(images) => Ok(images),
            Err(e) if e.is_storage_unavailable() => {
                warn!("Background image was changed but not saved: {}", e);
                Ok(self.preferences.background_images())
            }
            Err(e) => Err(e),
        }
    }

    /// Returns the preferences facade.
    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    /// Reacts to one engine event and returns the title to show, if any.
    ///
    /// On natural completion the selected sound is played through `player`.
    /// Missing sounds and playback errors are logged and never stop the timer.
    pub fn handle_event(
        &self,
        event: &TimerEvent,
        player: Option<&dyn SoundPlayer>,
    ) -> Option<String> {
        match event {
            TimerEvent::Started {
                phase,
                remaining_seconds,
            }
            | TimerEvent::Paused {
                phase,
                remaining_seconds,
            }
            | TimerEvent::Tick {
                phase,
                remaining_seconds,
            } => Some(window_title(*remaining_seconds, *phase)),
            TimerEvent::PhaseCompleted { next_phase } => {
                self.play_selected_sound(player);
                Some(phase_title(*next_phase))
            }
            TimerEvent::Skipped { next_phase } => Some(phase_title(*next_phase)),
            TimerEvent::Reset => Some(phase_title(Phase::Focus)),
            TimerEvent::Configured { .. } => None,
        }
    }

    fn play_selected_sound(&self, player: Option<&dyn SoundPlayer>) {
        let Some(reference) = self.selection.reference() else {
            debug!("No notification sound selected");
            return;
        };
        let Some(player) = player else {
            debug!("No audio player; skipping notification sound");
            return;
        };

        let result = self
            .catalog
            .resolve(reference)
            .and_then(|source| player.play(&source));
        if let Err(e) = result {
            warn!("Notification sound not played: {}", e);
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("selection", &self.selection)
            .field("theme", &self.theme)
            .field("ticking", &self.scheduler.is_active())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
