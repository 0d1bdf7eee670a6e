//! Notification sounds for the Pomodoro timer.
//!
//! This module provides:
//!
//! - The notification catalog (built-in tones plus discovered sound files)
//! - Persistable sound references and the user's selection
//! - Non-blocking playback through rodio
//! - Graceful degradation when audio is unavailable
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐  resolve   ┌──────────────────┐
//! │ NotificationCatalog  │───────────▶│   SoundSource    │
//! │ (SoundReference ...) │            └────────┬─────────┘
//! └──────────────────────┘                     │ play
//!                                              ▼
//!                                    ┌──────────────────┐
//!                                    │   SoundPlayer    │ ← injected
//!                                    └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use pomodoro_engine::sound::{NotificationCatalog, RodioSoundPlayer, SoundPlayer};
//!
//! let catalog = NotificationCatalog::discover();
//! let player = RodioSoundPlayer::new(false).expect("audio init");
//!
//! let entry = catalog.default_entry().expect("catalog is never empty");
//! let source = catalog.resolve(&entry.reference).expect("built-in tone");
//! player.play(&source).expect("playback failed");
//! ```

mod catalog;
mod embedded;
mod error;
mod player;
mod source;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub use catalog::{NotificationCatalog, NotificationSoundSelection, SoundEntry};
pub use embedded::{default_tone, find_embedded_tone, EmbeddedTone, EMBEDDED_TONES};
pub use error::SoundError;
pub use player::{try_create_player, RodioSoundPlayer};
pub use source::{
    discover_sound_files, ReferenceTarget, SoundReference, SoundSource, SYSTEM_SOUND_DIRS,
};

/// Trait for sound playback implementations.
///
/// This trait abstracts the sound playback functionality, allowing for
/// different implementations (e.g., rodio-based, mock for testing).
pub trait SoundPlayer {
    /// Plays a sound from the given source.
    ///
    /// This method should be non-blocking; the sound plays in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if playback fails.
    fn play(&self, source: &SoundSource) -> Result<(), SoundError>;

    /// Returns true if the audio system is available.
    fn is_available(&self) -> bool;

    /// Returns true if sound playback is disabled.
    fn is_disabled(&self) -> bool;

    /// Enables sound playback.
    fn enable(&self);

    /// Disables sound playback.
    fn disable(&self);
}

impl SoundPlayer for RodioSoundPlayer {
    fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        RodioSoundPlayer::play(self, source)
    }

    fn is_available(&self) -> bool {
        RodioSoundPlayer::is_available(self)
    }

    fn is_disabled(&self) -> bool {
        RodioSoundPlayer::is_disabled(self)
    }

    fn enable(&self) {
        RodioSoundPlayer::enable(self)
    }

    fn disable(&self) {
        RodioSoundPlayer::disable(self)
    }
}

/// Mock sound player for testing.
#[derive(Debug, Default)]
pub struct MockSoundPlayer {
    play_calls: Mutex<Vec<SoundSource>>,
    disabled: AtomicBool,
    should_fail: AtomicBool,
    unavailable: AtomicBool,
}

impl MockSoundPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.calls().len()
    }

    #[must_use]
    pub fn get_play_calls(&self) -> Vec<SoundSource> {
        self.calls().clone()
    }

    pub fn clear_calls(&self) {
        self.calls().clear();
    }

    fn calls(&self) -> std::sync::MutexGuard<'_, Vec<SoundSource>> {
        self.play_calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SoundPlayer for MockSoundPlayer {
    fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        if self.disabled.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.calls().push(source.clone());
        Ok(())
    }

    fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }

    fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    fn enable(&self) {
        self.disabled.store(false, Ordering::SeqCst);
    }

    fn disable(&self) {
        self.disabled.store(true, Ordering::SeqCst);
    }
}
