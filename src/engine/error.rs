//! Timer engine error types.

use thiserror::Error;

use crate::types::Phase;

/// Errors returned by the timer engine's control surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A phase duration was zero.
    #[error("{phase} duration must be at least one second (got {seconds})")]
    InvalidDuration {
        /// The phase whose duration was rejected
        phase: Phase,
        /// The rejected value
        seconds: u32,
    },
}

impl EngineError {
    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::InvalidDuration { .. } => "Choose focus and break durations of one second or more",
        }
    }
}
