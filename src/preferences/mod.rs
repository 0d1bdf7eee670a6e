//! Persisted user preferences.
//!
//! This module provides:
//! - `store`: the key/value [`PreferenceStore`] and its file and memory backends
//! - `images`: background image slots and their derived upload flags
//! - [`Preferences`]: typed access to the known keys with graceful degradation
//!
//! If the durable store fails, [`Preferences`] switches to an in-memory store
//! for the rest of the session. The failing call still returns its error so
//! the caller can report it once.

mod error;
mod images;
mod store;

use std::sync::atomic::{AtomicBool, Ordering};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

pub use error::PreferenceError;
pub use images::{validate_image_uri, BackgroundImageSet, ImagePosition, UploadedFlags};
pub use store::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, APP_DIR_NAME};

use crate::sound::{NotificationSoundSelection, SoundReference};
use crate::types::{Theme, TimerConfiguration};

/// Keys of the persisted preferences.
pub mod keys {
    /// `{top, bottom, left, right}` of image data URIs or null
    pub const BACKGROUND_IMAGES: &str = "backgroundImages";
    /// Sound reference string; absent means no sound
    pub const SELECTED_NOTIFICATION_SOUND: &str = "selectedNotificationSound";
    /// `{focusDurationSeconds, breakDurationSeconds}`
    pub const TIMER_DURATIONS: &str = "timerDurations";
    /// Bool
    pub const DARK_MODE: &str = "darkMode";
}

// ============================================================================
// Preferences
// ============================================================================

/// Typed view over a [`PreferenceStore`].
pub struct Preferences {
    store: Box<dyn PreferenceStore>,
    fallback: MemoryPreferenceStore,
    degraded: AtomicBool,
}

impl Preferences {
    /// Wraps a store.
    pub fn new(store: impl PreferenceStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            fallback: MemoryPreferenceStore::new(),
            degraded: AtomicBool::new(false),
        }
    }

    /// Preferences that live only as long as this value.
    pub fn in_memory() -> Self {
        Self::new(MemoryPreferenceStore::new())
    }

    /// Opens the file store in the platform config directory.
    ///
    /// Falls back to memory if the platform has no config directory.
    pub fn open_default() -> Self {
        match FilePreferenceStore::default_dir() {
            Some(dir) => {
                info!(dir = %dir.display(), "Using preference directory");
                Self::new(FilePreferenceStore::new(dir))
            }
            None => {
                warn!("No config directory available; preferences will not persist");
                Self::in_memory()
            }
        }
    }

    /// Returns true once the durable store has failed and memory is in use.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    // ------------------------------------------------------------------------
    // Background images
    // ------------------------------------------------------------------------

    /// Returns the stored background images (all empty if none stored).
    pub fn background_images(&self) -> BackgroundImageSet {
        self.read_typed(keys::BACKGROUND_IMAGES).unwrap_or_default()
    }

    /// Stores or clears the image at `position` and returns the updated set.
    ///
    /// # Errors
    ///
    /// Returns `PreferenceError::InvalidImage` for a non-image URI (nothing is
    /// written), or a storage error (the change is kept in memory).
    pub fn set_background_image(
        &self,
        position: ImagePosition,
        uri: Option<String>,
    ) -> Result<BackgroundImageSet, PreferenceError> {
        let mut images = self.background_images();
        images.set(position, uri)?;
        self.write_typed(keys::BACKGROUND_IMAGES, &images)?;
        Ok(images)
    }

    // ------------------------------------------------------------------------
    // Notification sound
    // ------------------------------------------------------------------------

    /// Returns the stored sound choice (`None` if nothing is stored).
    pub fn sound_selection(&self) -> NotificationSoundSelection {
        let reference: Option<SoundReference> = self.read_typed(keys::SELECTED_NOTIFICATION_SOUND);
        NotificationSoundSelection::from_stored(reference)
    }

    /// Stores the sound choice; `None` removes the key.
    ///
    /// # Errors
    ///
    /// Returns a storage error (the change is kept in memory).
    pub fn set_sound_selection(
        &self,
        reference: Option<&SoundReference>,
    ) -> Result<(), PreferenceError> {
        match reference {
            Some(reference) => self.write_typed(keys::SELECTED_NOTIFICATION_SOUND, reference),
            None => self.remove(keys::SELECTED_NOTIFICATION_SOUND),
        }
    }

    // ------------------------------------------------------------------------
    // Timer durations
    // ------------------------------------------------------------------------

    /// Returns the stored durations, or the defaults if none or invalid.
    pub fn timer_configuration(&self) -> TimerConfiguration {
        let Some(config) = self.read_typed::<TimerConfiguration>(keys::TIMER_DURATIONS) else {
            return TimerConfiguration::default();
        };
        match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!("Ignoring stored timer durations: {}", e);
                TimerConfiguration::default()
            }
        }
    }

    /// Stores the durations.
    ///
    /// # Errors
    ///
    /// Returns a storage error (the change is kept in memory).
    pub fn set_timer_configuration(
        &self,
        config: &TimerConfiguration,
    ) -> Result<(), PreferenceError> {
        self.write_typed(keys::TIMER_DURATIONS, config)
    }

    // ------------------------------------------------------------------------
    // Theme
    // ------------------------------------------------------------------------

    /// Returns the stored theme (light if none stored).
    pub fn theme(&self) -> Theme {
        let dark_mode: Option<bool> = self.read_typed(keys::DARK_MODE);
        Theme::from_dark_mode(dark_mode.unwrap_or(false))
    }

    /// Stores the theme.
    ///
    /// # Errors
    ///
    /// Returns a storage error (the change is kept in memory).
    pub fn set_theme(&self, theme: Theme) -> Result<(), PreferenceError> {
        self.write_typed(keys::DARK_MODE, &theme.is_dark())
    }

    // ------------------------------------------------------------------------
    // Store access with degradation
    // ------------------------------------------------------------------------

    fn active_store(&self) -> &dyn PreferenceStore {
        if self.is_degraded() {
            &self.fallback
        } else {
            self.store.as_ref()
        }
    }

    fn degrade(&self, err: &PreferenceError) {
        if !self.degraded.swap(true, Ordering::Relaxed) {
            warn!(
                "Preference storage unavailable, keeping preferences in memory for this session: {}",
                err
            );
        }
    }

    fn read(&self, key: &str) -> Option<Value> {
        match self.active_store().get(key) {
            Ok(value) => value,
            Err(e) if e.is_storage_unavailable() => {
                self.degrade(&e);
                None
            }
            Err(e) => {
                warn!("Using default for preference '{}': {}", key, e);
                None
            }
        }
    }

    fn read_typed<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.read(key)?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                warn!("Using default for malformed preference '{}': {}", key, e);
                None
            }
        }
    }

    fn write_typed<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), PreferenceError> {
        let value = serde_json::to_value(value).map_err(|source| PreferenceError::Serialization {
            key: key.to_string(),
            source,
        })?;
        self.with_fallback(key, |store| store.set(key, value.clone()))
    }

    fn remove(&self, key: &str) -> Result<(), PreferenceError> {
        self.with_fallback(key, |store| store.remove(key))
    }

    /// Runs a write against the active store; on storage failure, degrades
    /// and repeats it against memory before returning the original error.
    fn with_fallback<F>(&self, key: &str, op: F) -> Result<(), PreferenceError>
    where
        F: Fn(&dyn PreferenceStore) -> Result<(), PreferenceError>,
    {
        match op(self.active_store()) {
            Err(e) if e.is_storage_unavailable() => {
                self.degrade(&e);
                if let Err(mem_err) = op(&self.fallback) {
                    warn!("In-memory write of '{}' failed: {}", key, mem_err);
                }
                Err(e)
            }
            other => other,
        }
    }
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field("degraded", &self.is_degraded())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
