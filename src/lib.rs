//! Pomodoro Timer Library
//!
//! This library provides the core functionality of a focus/break countdown
//! timer. It includes:
//! - Timer engine with phase transitions, progress angle and a single tick source
//! - Persisted preferences (durations, sound, background images, theme)
//! - Notification sound catalog and playback
//! - Session wiring that keeps engine, clock and preferences in step
//! - CLI command parsing and display utilities

pub mod cli;
pub mod engine;
pub mod preferences;
pub mod session;
pub mod sound;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{ApplyTo, Phase, Theme, TimerConfiguration, TimerSnapshot};

// Re-export engine types
pub use engine::{EngineError, TickOutcome, TickScheduler, TimerEngine, TimerEvent};

// Re-export preference types
pub use preferences::{
    BackgroundImageSet, FilePreferenceStore, ImagePosition, MemoryPreferenceStore,
    PreferenceError, PreferenceStore, Preferences,
};

// Re-export sound types
pub use sound::{
    MockSoundPlayer, NotificationCatalog, NotificationSoundSelection, RodioSoundPlayer,
    SoundError, SoundPlayer, SoundReference, SoundSource,
};

pub use session::Session;
