//! Preference store error types.
//!
//! Storage problems never stop the timer: callers log them and carry on with
//! in-memory values for the rest of the session.

use std::io;

use thiserror::Error;

/// Errors that can occur while reading or writing preferences.
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// The durable store could not be read or written.
    #[error("preference storage unavailable for '{key}': {source}")]
    StorageUnavailable {
        /// Key being accessed
        key: String,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// A stored value could not be (de)serialized.
    #[error("malformed preference value for '{key}': {source}")]
    Serialization {
        /// Key being accessed
        key: String,
        /// Underlying JSON failure
        #[source]
        source: serde_json::Error,
    },

    /// The key contains characters that cannot name a stored entry.
    #[error("invalid preference key '{0}'")]
    InvalidKey(String),

    /// A background image was not an image data URI.
    #[error("invalid background image: {0}")]
    InvalidImage(String),

    /// A position name did not match top, bottom, left or right.
    #[error("unknown image position '{0}' (expected top, bottom, left or right)")]
    UnknownPosition(String),
}

impl PreferenceError {
    /// Returns true if the durable store itself failed.
    #[must_use]
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. })
    }

    /// Returns true if the caller passed a bad value (as opposed to a storage fault).
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidKey(_) | Self::InvalidImage(_) | Self::UnknownPosition(_)
        )
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::StorageUnavailable { .. } => {
                "Check permissions of the data directory; changes are kept in memory for now"
            }
            Self::Serialization { .. } => "The stored value was replaced by its default",
            Self::InvalidKey(_) => "Use ASCII letters, digits, '-' or '_' in keys",
            Self::InvalidImage(_) => "Provide an image as a data:image/... URI",
            Self::UnknownPosition(_) => "Use one of: top, bottom, left, right",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage_error() -> PreferenceError {
        PreferenceError::StorageUnavailable {
            key: "darkMode".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = storage_error();
        assert!(err.to_string().contains("darkMode"));
        assert!(err.to_string().contains("read-only"));

        let err = PreferenceError::InvalidImage("not a data uri".to_string());
        assert!(err.to_string().contains("not a data uri"));

        let err = PreferenceError::UnknownPosition("middle".to_string());
        assert!(err.to_string().contains("middle"));
    }

    #[test]
    fn test_is_storage_unavailable() {
        assert!(storage_error().is_storage_unavailable());
        assert!(!PreferenceError::InvalidKey("a/b".into()).is_storage_unavailable());
    }

    #[test]
    fn test_is_invalid_input() {
        assert!(PreferenceError::InvalidKey("x".into()).is_invalid_input());
        assert!(PreferenceError::InvalidImage("x".into()).is_invalid_input());
        assert!(PreferenceError::UnknownPosition("x".into()).is_invalid_input());
        assert!(!storage_error().is_invalid_input());
    }

    #[test]
    fn test_suggestion() {
        assert!(storage_error().suggestion().contains("memory"));
        assert!(PreferenceError::InvalidImage("x".into())
            .suggestion()
            .contains("data:image"));
    }
}
