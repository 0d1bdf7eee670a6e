//! Key/value preference stores.
//!
//! Values are JSON documents. Each key is stored and replaced on its own, so
//! concurrent writers to different keys never conflict and the last writer to
//! a key wins.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;
use tracing::debug;

use super::error::PreferenceError;

/// Directory name used under the platform config directory.
pub const APP_DIR_NAME: &str = "pomodoro-engine";

/// Extension of stored value files.
const VALUE_EXTENSION: &str = "json";

/// Durable string-keyed store of JSON values.
pub trait PreferenceStore: Send + Sync {
    /// Reads the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or the stored value is
    /// not valid JSON.
    fn get(&self, key: &str) -> Result<Option<Value>, PreferenceError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn set(&self, key: &str, value: Value) -> Result<(), PreferenceError>;

    /// Removes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn remove(&self, key: &str) -> Result<(), PreferenceError>;
}

fn validate_key(key: &str) -> Result<(), PreferenceError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(PreferenceError::InvalidKey(key.to_string()))
    }
}

// ============================================================================
// FilePreferenceStore
// ============================================================================

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    dir: PathBuf,
}

impl FilePreferenceStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the platform default directory, e.g. `~/.config/pomodoro-engine`.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME))
    }

    /// Returns the directory this store writes to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{VALUE_EXTENSION}"))
    }

    fn unavailable(key: &str, source: io::Error) -> PreferenceError {
        PreferenceError::StorageUnavailable {
            key: key.to_string(),
            source,
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<Value>, PreferenceError> {
        validate_key(key)?;
        let path = self.value_path(key);

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::unavailable(key, e)),
        };

        let value = serde_json::from_str(&contents).map_err(|source| {
            PreferenceError::Serialization {
                key: key.to_string(),
                source,
            }
        })?;
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: Value) -> Result<(), PreferenceError> {
        validate_key(key)?;
        fs::create_dir_all(&self.dir).map_err(|e| Self::unavailable(key, e))?;

        let json = serde_json::to_string_pretty(&value).map_err(|source| {
            PreferenceError::Serialization {
                key: key.to_string(),
                source,
            }
        })?;

        // Each write gets its own temp file, then an atomic rename over the
        // value. Concurrent writers never share a temp path; the last rename wins.
        let path = self.value_path(key);
        let mut tmp = tempfile::Builder::new()
            .prefix(&format!(".{key}."))
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .map_err(|e| Self::unavailable(key, e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| Self::unavailable(key, e))?;
        // On failure the temp file is dropped and deleted.
        tmp.persist(&path)
            .map_err(|e| Self::unavailable(key, e.error))?;

        debug!(key, path = %path.display(), "Preference written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PreferenceError> {
        validate_key(key)?;
        match fs::remove_file(self.value_path(key)) {
            Ok(()) => {
                debug!(key, "Preference removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::unavailable(key, e)),
        }
    }
}

// ============================================================================
// MemoryPreferenceStore
// ============================================================================

/// Volatile store used for tests and as the fallback when disk storage fails.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryPreferenceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        // A poisoned map still holds consistent JSON values.
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<Value>, PreferenceError> {
        validate_key(key)?;
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), PreferenceError> {
        validate_key(key)?;
        self.values().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PreferenceError> {
        validate_key(key)?;
        self.values().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod key_tests {
        use super::*;

        #[test]
        fn test_valid_keys() {
            assert!(validate_key("backgroundImages").is_ok());
            assert!(validate_key("dark_mode-2").is_ok());
        }

        #[test]
        fn test_invalid_keys() {
            assert!(validate_key("").is_err());
            assert!(validate_key("../escape").is_err());
            assert!(validate_key("a b").is_err());
            assert!(validate_key("nested/key").is_err());
        }
    }

    mod file_store_tests {
        use super::*;

        #[test]
        fn test_get_missing_key_is_none() {
            let dir = tempfile::tempdir().unwrap();
            let store = FilePreferenceStore::new(dir.path());

            assert!(store.get("darkMode").unwrap().is_none());
        }

        #[test]
        fn test_set_then_get() {
            let dir = tempfile::tempdir().unwrap();
            let store = FilePreferenceStore::new(dir.path().join("nested"));

            store.set("darkMode", json!(true)).unwrap();

            assert_eq!(store.get("darkMode").unwrap(), Some(json!(true)));
            assert!(dir.path().join("nested/darkMode.json").exists());
        }

        #[test]
        fn test_set_overwrites() {
            let dir = tempfile::tempdir().unwrap();
            let store = FilePreferenceStore::new(dir.path());

            store.set("selectedNotificationSound", json!("a")).unwrap();
            store.set("selectedNotificationSound", json!("b")).unwrap();

            assert_eq!(
                store.get("selectedNotificationSound").unwrap(),
                Some(json!("b"))
            );
            let leftovers: Vec<_> = fs::read_dir(dir.path())
                .unwrap()
                .flatten()
                .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
                .collect();
            assert!(leftovers.is_empty());
        }

        #[test]
        fn test_concurrent_writes_to_one_key_last_write_wins() {
            let dir = tempfile::tempdir().unwrap();
            let store = std::sync::Arc::new(FilePreferenceStore::new(dir.path()));

            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let store = std::sync::Arc::clone(&store);
                    std::thread::spawn(move || {
                        (0..100)
                            .filter(|n| store.set("darkMode", json!((i + n) % 2 == 0)).is_err())
                            .count()
                    })
                })
                .collect();
            let failures: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

            assert_eq!(failures, 0);
            let stored = store.get("darkMode").unwrap().unwrap();
            assert!(stored.is_boolean());
            let leftovers = fs::read_dir(dir.path()).unwrap().count();
            assert_eq!(leftovers, 1);
        }

        #[test]
        fn test_keys_are_independent() {
            let dir = tempfile::tempdir().unwrap();
            let store = FilePreferenceStore::new(dir.path());

            store.set("darkMode", json!(true)).unwrap();
            store.set("timerDurations", json!({"a": 1})).unwrap();
            store.remove("darkMode").unwrap();

            assert!(store.get("darkMode").unwrap().is_none());
            assert_eq!(store.get("timerDurations").unwrap(), Some(json!({"a": 1})));
        }

        #[test]
        fn test_remove_missing_key_is_ok() {
            let dir = tempfile::tempdir().unwrap();
            let store = FilePreferenceStore::new(dir.path());

            assert!(store.remove("darkMode").is_ok());
        }

        #[test]
        fn test_malformed_value_is_serialization_error() {
            let dir = tempfile::tempdir().unwrap();
            fs::write(dir.path().join("darkMode.json"), "{not json").unwrap();
            let store = FilePreferenceStore::new(dir.path());

            let err = store.get("darkMode").unwrap_err();
            assert!(matches!(err, PreferenceError::Serialization { .. }));
        }

        #[test]
        fn test_unwritable_directory_is_storage_unavailable() {
            let dir = tempfile::tempdir().unwrap();
            let blocker = dir.path().join("blocker");
            fs::write(&blocker, "file, not a directory").unwrap();
            let store = FilePreferenceStore::new(&blocker);

            let err = store.set("darkMode", json!(true)).unwrap_err();
            assert!(err.is_storage_unavailable());
        }

        #[test]
        fn test_invalid_key_rejected() {
            let dir = tempfile::tempdir().unwrap();
            let store = FilePreferenceStore::new(dir.path());

            let err = store.set("../darkMode", json!(true)).unwrap_err();
            assert!(matches!(err, PreferenceError::InvalidKey(_)));
        }
    }

    mod memory_store_tests {
        use super::*;

        #[test]
        fn test_roundtrip_and_remove() {
            let store = MemoryPreferenceStore::new();

            assert!(store.get("darkMode").unwrap().is_none());
            store.set("darkMode", json!(false)).unwrap();
            assert_eq!(store.get("darkMode").unwrap(), Some(json!(false)));
            store.remove("darkMode").unwrap();
            assert!(store.get("darkMode").unwrap().is_none());
        }
    }
}
