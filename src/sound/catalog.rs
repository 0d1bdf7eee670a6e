//! Notification sound catalog.
//!
//! The catalog is a fixed, ordered list built once at startup. The engine
//! never plays anything itself; it only carries a [`SoundReference`] that the
//! catalog resolves into a [`SoundSource`] for the injected player.

use std::path::Path;

use tracing::debug;

use super::embedded::{find_embedded_tone, EMBEDDED_TONES};
use super::error::SoundError;
use super::source::{
    discover_sound_files, ReferenceTarget, SoundReference, SoundSource, SYSTEM_SOUND_DIRS,
};

/// One selectable notification sound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundEntry {
    /// Display name
    pub name: String,
    /// Persistable reference
    pub reference: SoundReference,
}

impl SoundEntry {
    /// Creates an entry.
    pub fn new(name: impl Into<String>, reference: SoundReference) -> Self {
        Self {
            name: name.into(),
            reference,
        }
    }
}

/// The user's notification sound choice.
///
/// `None` is an explicit "no sound" choice and differs from `NotLoaded`,
/// which only exists until preferences have been read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NotificationSoundSelection {
    /// Preferences not read yet
    #[default]
    NotLoaded,
    /// No sound plays at completion
    None,
    /// This sound plays at completion
    Selected(SoundReference),
}

impl NotificationSoundSelection {
    /// Builds a loaded selection from an optional stored reference.
    pub fn from_stored(reference: Option<SoundReference>) -> Self {
        match reference {
            Some(reference) => Self::Selected(reference),
            None => Self::None,
        }
    }

    /// Returns the selected reference, if any.
    pub fn reference(&self) -> Option<&SoundReference> {
        match self {
            Self::Selected(reference) => Some(reference),
            Self::NotLoaded | Self::None => None,
        }
    }

    /// Returns true once preferences have been read.
    pub fn is_loaded(&self) -> bool {
        !matches!(self, Self::NotLoaded)
    }
}

// ============================================================================
// NotificationCatalog
// ============================================================================

/// Read-only list of available notification sounds.
#[derive(Debug, Clone)]
pub struct NotificationCatalog {
    entries: Vec<SoundEntry>,
}

impl Default for NotificationCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl NotificationCatalog {
    /// Creates a catalog from explicit entries, keeping their order.
    pub fn new(entries: Vec<SoundEntry>) -> Self {
        Self { entries }
    }

    /// Catalog of the built-in tones only.
    pub fn builtin() -> Self {
        let entries = EMBEDDED_TONES
            .iter()
            .map(|tone| SoundEntry::new(tone.name, SoundReference::embedded(tone.name)))
            .collect();
        Self { entries }
    }

    /// Built-in tones followed by sound files found in `dirs`.
    pub fn with_sound_dirs<P: AsRef<Path>>(dirs: &[P]) -> Self {
        let mut catalog = Self::builtin();
        for source in discover_sound_files(dirs) {
            let Some(path) = source.path() else {
                continue;
            };
            match SoundReference::file(path) {
                Some(reference) => catalog
                    .entries
                    .push(SoundEntry::new(source.name(), reference)),
                None => debug!(path = %path.display(), "Skipping sound with non UTF-8 path"),
            }
        }
        debug!(count = catalog.entries.len(), "Notification catalog built");
        catalog
    }

    /// Built-in tones followed by the system sounds on this machine.
    pub fn discover() -> Self {
        Self::with_sound_dirs(SYSTEM_SOUND_DIRS)
    }

    /// Returns every entry in order.
    pub fn list(&self) -> &[SoundEntry] {
        &self.entries
    }

    /// Returns the entry offered when nothing has been chosen yet.
    pub fn default_entry(&self) -> Option<&SoundEntry> {
        self.entries.first()
    }

    /// Finds an entry by reference.
    pub fn find(&self, reference: &SoundReference) -> Option<&SoundEntry> {
        self.entries.iter().find(|entry| &entry.reference == reference)
    }

    /// Finds an entry by display name (case-insensitive, first match).
    pub fn find_by_name(&self, name: &str) -> Option<&SoundEntry> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    /// Resolves a reference into something playable.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::MissingResource` if the reference is not in the
    /// catalog or the file it names has disappeared.
    pub fn resolve(&self, reference: &SoundReference) -> Result<SoundSource, SoundError> {
        let entry = self
            .find(reference)
            .ok_or_else(|| SoundError::MissingResource(reference.to_string()))?;

        match reference.target() {
            ReferenceTarget::Embedded(name) => find_embedded_tone(name)
                .map(SoundSource::Embedded)
                .ok_or_else(|| SoundError::MissingResource(reference.to_string())),
            ReferenceTarget::File(path) if path.is_file() => {
                Ok(SoundSource::file(entry.name.clone(), path))
            }
            ReferenceTarget::File(_) | ReferenceTarget::Unknown => {
                Err(SoundError::MissingResource(reference.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod selection_tests {
        use super::*;

        #[test]
        fn test_default_is_not_loaded() {
            let selection = NotificationSoundSelection::default();
            assert!(!selection.is_loaded());
            assert!(selection.reference().is_none());
        }

        #[test]
        fn test_none_is_loaded_but_empty() {
            let selection = NotificationSoundSelection::from_stored(None);
            assert_eq!(selection, NotificationSoundSelection::None);
            assert!(selection.is_loaded());
            assert!(selection.reference().is_none());
        }

        #[test]
        fn test_selected() {
            let reference = SoundReference::embedded("Bell");
            let selection = NotificationSoundSelection::from_stored(Some(reference.clone()));
            assert_eq!(selection.reference(), Some(&reference));
        }
    }

    mod catalog_tests {
        use super::*;

        #[test]
        fn test_builtin_lists_embedded_tones_in_order() {
            let catalog = NotificationCatalog::builtin();
            let names: Vec<&str> = catalog.list().iter().map(|e| e.name.as_str()).collect();

            assert_eq!(names, vec!["Chime", "Bell", "Gentle", "Alert"]);
            assert_eq!(catalog.default_entry().unwrap().name, "Chime");
        }

        #[test]
        fn test_with_sound_dirs_appends_files() {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("Glass.wav"), b"RIFF").unwrap();

            let catalog = NotificationCatalog::with_sound_dirs(&[dir.path()]);

            let last = catalog.list().last().unwrap();
            assert_eq!(last.name, "Glass");
            assert_eq!(
                last.reference,
                SoundReference::file(&dir.path().join("Glass.wav")).unwrap()
            );
        }

        #[test]
        fn test_find_by_name_is_case_insensitive() {
            let catalog = NotificationCatalog::builtin();
            let entry = catalog.find_by_name("gentle").unwrap();
            assert_eq!(entry.reference, SoundReference::embedded("Gentle"));
            assert!(catalog.find_by_name("Siren").is_none());
        }

        #[test]
        fn test_resolve_embedded() {
            let catalog = NotificationCatalog::builtin();
            let source = catalog.resolve(&SoundReference::embedded("Alert")).unwrap();
            assert!(source.is_embedded());
            assert_eq!(source.name(), "Alert");
        }

        #[test]
        fn test_resolve_unknown_reference_is_missing() {
            let catalog = NotificationCatalog::builtin();
            let err = catalog
                .resolve(&SoundReference::embedded("Siren"))
                .unwrap_err();
            assert!(matches!(err, SoundError::MissingResource(_)));
        }

        #[test]
        fn test_resolve_deleted_file_is_missing() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("Pop.wav");
            std::fs::write(&path, b"RIFF").unwrap();
            let catalog = NotificationCatalog::with_sound_dirs(&[dir.path()]);
            let reference = SoundReference::file(&path).unwrap();

            assert!(catalog.resolve(&reference).is_ok());
            std::fs::remove_file(&path).unwrap();

            let err = catalog.resolve(&reference).unwrap_err();
            assert!(matches!(err, SoundError::MissingResource(_)));
        }

        #[cfg(unix)]
        #[test]
        fn test_with_sound_dirs_skips_non_utf8_names() {
            use std::ffi::OsStr;
            use std::os::unix::ffi::OsStrExt;

            let dir = tempfile::tempdir().unwrap();
            let odd = dir.path().join(OsStr::from_bytes(b"Caf\xe9.wav"));
            if std::fs::write(&odd, b"RIFF").is_err() {
                // Filesystem refuses non UTF-8 names.
                return;
            }
            std::fs::write(dir.path().join("Glass.wav"), b"RIFF").unwrap();

            let catalog = NotificationCatalog::with_sound_dirs(&[dir.path()]);

            let files: Vec<&SoundEntry> = catalog
                .list()
                .iter()
                .filter(|entry| matches!(entry.reference.target(), ReferenceTarget::File(_)))
                .collect();
            assert_eq!(files.len(), 1);
            assert_eq!(files[0].name, "Glass");
            for entry in catalog.list() {
                assert!(catalog.resolve(&entry.reference).is_ok());
            }
        }
    }
}
