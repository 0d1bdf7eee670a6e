//! Sound system error types.
//!
//! None of these errors is fatal to the timer: a sound that cannot be played
//! is logged and the countdown carries on.

use thiserror::Error;

/// Errors that can occur in the sound playback system.
#[derive(Debug, Error)]
pub enum SoundError {
    /// A notification sound reference no longer resolves to a playable sound.
    #[error("notification sound not available: {0}")]
    MissingResource(String),

    /// Audio device is not available (e.g., no speakers connected).
    #[error("audio device not available: {0}")]
    DeviceNotAvailable(String),

    /// Sound file was not found at the specified path.
    #[error("sound file not found: {0}")]
    FileNotFound(String),

    /// Failed to decode the audio file.
    #[error("failed to decode sound file: {0}")]
    DecodeError(String),

    /// Failed to create the audio output stream.
    #[error("failed to create audio stream: {0}")]
    StreamError(String),

    /// Generic sound playback error.
    #[error("sound playback error: {0}")]
    PlaybackError(String),
}

impl SoundError {
    /// Returns true if this error is related to device availability.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_) | Self::StreamError(_))
    }

    /// Returns true if this error is related to the sound itself.
    #[must_use]
    pub fn is_resource_error(&self) -> bool {
        matches!(
            self,
            Self::MissingResource(_) | Self::FileNotFound(_) | Self::DecodeError(_)
        )
    }

    /// Returns true if playback should fall back to the embedded tone.
    #[must_use]
    pub fn should_fallback_to_embedded(&self) -> bool {
        matches!(self, Self::FileNotFound(_) | Self::DecodeError(_))
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::MissingResource(_) => "Pick another sound with `sound list` / `sound select`",
            Self::DeviceNotAvailable(_) => "Connect an audio output device",
            Self::FileNotFound(_) => "The built-in chime will be played instead",
            Self::DecodeError(_) => "The sound file may be corrupted",
            Self::StreamError(_) => "Check the system audio settings",
            Self::PlaybackError(_) => "Restart the application",
        }
    }
}
