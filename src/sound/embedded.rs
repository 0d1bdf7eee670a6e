//! Built-in notification tones.
//!
//! These are synthesized at playback time, so they work without any sound
//! files on disk and serve as the fallback when a file cannot be played.

/// A synthesized sine tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbeddedTone {
    /// Display name, also used in the `embedded:<name>` reference
    pub name: &'static str,
    /// Pitch in Hz
    pub frequency_hz: f32,
    /// Length in milliseconds
    pub duration_ms: u64,
}

/// Tones shipped with the binary. The first one is the default.
pub const EMBEDDED_TONES: &[EmbeddedTone] = &[
    EmbeddedTone {
        name: "Chime",
        frequency_hz: 880.0,
        duration_ms: 500,
    },
    EmbeddedTone {
        name: "Bell",
        frequency_hz: 660.0,
        duration_ms: 700,
    },
    EmbeddedTone {
        name: "Gentle",
        frequency_hz: 440.0,
        duration_ms: 900,
    },
    EmbeddedTone {
        name: "Alert",
        frequency_hz: 1320.0,
        duration_ms: 300,
    },
];

/// Returns the default tone.
#[must_use]
pub fn default_tone() -> EmbeddedTone {
    EMBEDDED_TONES[0]
}

/// Finds a tone by name (case-insensitive).
#[must_use]
pub fn find_embedded_tone(name: &str) -> Option<EmbeddedTone> {
    EMBEDDED_TONES
        .iter()
        .find(|tone| tone.name.eq_ignore_ascii_case(name))
        .copied()
}
