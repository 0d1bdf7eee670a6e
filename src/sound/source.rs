//! Sound references and playable sources.
//!
//! A [`SoundReference`] is the opaque string that gets persisted
//! (`embedded:<name>` or `file:<path>`). A [`SoundSource`] is what the player
//! actually plays once a reference has been resolved.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::embedded::EmbeddedTone;

const EMBEDDED_SCHEME: &str = "embedded:";
const FILE_SCHEME: &str = "file:";

// ============================================================================
// SoundReference
// ============================================================================

/// Persistable handle to one notification sound.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoundReference(String);

/// What a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceTarget<'a> {
    /// A built-in tone, by name
    Embedded(&'a str),
    /// A sound file on disk
    File(&'a Path),
    /// Unrecognized scheme
    Unknown,
}

impl SoundReference {
    /// Wraps a stored reference string as-is.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Reference to a built-in tone.
    pub fn embedded(name: &str) -> Self {
        Self(format!("{EMBEDDED_SCHEME}{name}"))
    }

    /// Reference to a sound file.
    ///
    /// Returns `None` for paths that are not valid UTF-8, since the stored
    /// string could not name them again.
    pub fn file(path: &Path) -> Option<Self> {
        path.to_str().map(|path| Self(format!("{FILE_SCHEME}{path}")))
    }

    /// Returns the raw reference string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the reference into its scheme and target.
    pub fn target(&self) -> ReferenceTarget<'_> {
        if let Some(name) = self.0.strip_prefix(EMBEDDED_SCHEME) {
            ReferenceTarget::Embedded(name)
        } else if let Some(path) = self.0.strip_prefix(FILE_SCHEME) {
            ReferenceTarget::File(Path::new(path))
        } else {
            ReferenceTarget::Unknown
        }
    }
}

impl fmt::Display for SoundReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SoundSource
// ============================================================================

/// Represents the source of a sound to be played.
#[derive(Debug, Clone, PartialEq)]
pub enum SoundSource {
    /// A sound file, e.g. from `/System/Library/Sounds/`.
    File {
        /// The name of the sound (e.g., "Glass").
        name: String,
        /// The full path to the sound file.
        path: PathBuf,
    },
    /// A tone synthesized at playback time.
    Embedded(EmbeddedTone),
}

impl SoundSource {
    /// Creates a new file sound source.
    #[must_use]
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::File {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Returns the name of the sound source.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } => name,
            Self::Embedded(tone) => tone.name,
        }
    }

    /// Returns true if this is an embedded tone.
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded(_))
    }

    /// Returns the file path if this is a file sound.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File { path, .. } => Some(path),
            Self::Embedded(_) => None,
        }
    }
}

// ============================================================================
// File discovery
// ============================================================================

/// Directories to search for system sounds, in order of priority.
pub const SYSTEM_SOUND_DIRS: &[&str] = &[
    "/System/Library/Sounds",
    "/Library/Sounds",
    "/usr/share/sounds/freedesktop/stereo",
];

/// Supported audio file extensions.
const SUPPORTED_EXTENSIONS: &[&str] = &["aiff", "wav", "mp3", "flac", "ogg", "oga"];

/// Scans `dirs` for playable sound files.
///
/// Missing or unreadable directories are skipped. Results are sorted by name.
#[must_use]
pub fn discover_sound_files<P: AsRef<Path>>(dirs: &[P]) -> Vec<SoundSource> {
    let mut sounds = Vec::new();

    for dir in dirs {
        let Ok(entries) = std::fs::read_dir(dir.as_ref()) else {
            continue;
        };

        for entry in entries.flatten() {
            let file_path = entry.path();
            let supported = file_path
                .extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()));
            if !supported {
                continue;
            }
            if let Some(stem) = file_path.file_stem() {
                sounds.push(SoundSource::File {
                    name: stem.to_string_lossy().into_owned(),
                    path: file_path,
                });
            }
        }
    }

    // Sort by name for consistent ordering
    sounds.sort_by(|a, b| a.name().cmp(b.name()));
    sounds
}
