//! Core data types for the Pomodoro timer.
//!
//! This module defines the data structures used for:
//! - Phase tracking (Focus / Break)
//! - Timer configuration with validation
//! - Read-only snapshots of the timer state
//! - The persisted light/dark theme choice

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::EngineError;

// ============================================================================
// Defaults
// ============================================================================

/// Default focus duration in seconds (one hour).
pub const DEFAULT_FOCUS_SECONDS: u32 = 3600;

/// Default break duration in seconds.
pub const DEFAULT_BREAK_SECONDS: u32 = 300;

/// Focus duration of the classic 25-minute pomodoro.
pub const CLASSIC_FOCUS_SECONDS: u32 = 1500;

// ============================================================================
// Phase
// ============================================================================

/// One of the two alternating countdown modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Focused work
    #[default]
    Focus,
    /// Rest between focus sessions
    Break,
}

impl Phase {
    /// Returns the label used in titles and status output.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Focus => "Focus",
            Phase::Break => "Break",
        }
    }

    /// Returns the phase that follows this one.
    pub fn next(&self) -> Phase {
        match self {
            Phase::Focus => Phase::Break,
            Phase::Break => Phase::Focus,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// TimerConfiguration
// ============================================================================

/// Durations of the two phases.
///
/// Serialized with the camelCase keys used by the `timerDurations` preference.
/// A missing key reads as its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfiguration {
    /// Focus duration in seconds (> 0)
    #[serde(rename = "focusDurationSeconds", default = "default_focus_seconds")]
    pub focus_seconds: u32,
    /// Break duration in seconds (> 0)
    #[serde(rename = "breakDurationSeconds", default = "default_break_seconds")]
    pub break_seconds: u32,
}

fn default_focus_seconds() -> u32 {
    DEFAULT_FOCUS_SECONDS
}

fn default_break_seconds() -> u32 {
    DEFAULT_BREAK_SECONDS
}

impl Default for TimerConfiguration {
    fn default() -> Self {
        Self {
            focus_seconds: DEFAULT_FOCUS_SECONDS,
            break_seconds: DEFAULT_BREAK_SECONDS,
        }
    }
}

impl TimerConfiguration {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidDuration` if either duration is zero.
    pub fn new(focus_seconds: u32, break_seconds: u32) -> Result<Self, EngineError> {
        let config = Self {
            focus_seconds,
            break_seconds,
        };
        config.validate()?;
        Ok(config)
    }

    /// The 25 minute focus / 5 minute break preset.
    pub fn classic() -> Self {
        Self {
            focus_seconds: CLASSIC_FOCUS_SECONDS,
            break_seconds: DEFAULT_BREAK_SECONDS,
        }
    }

    /// Returns the configured duration of the given phase.
    pub fn duration_of(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Focus => self.focus_seconds,
            Phase::Break => self.break_seconds,
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidDuration` naming the first zero duration.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.focus_seconds == 0 {
            return Err(EngineError::InvalidDuration {
                phase: Phase::Focus,
                seconds: self.focus_seconds,
            });
        }
        if self.break_seconds == 0 {
            return Err(EngineError::InvalidDuration {
                phase: Phase::Break,
                seconds: self.break_seconds,
            });
        }
        Ok(())
    }
}

// ============================================================================
// ApplyTo
// ============================================================================

/// Which phase a configuration change takes effect in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyTo {
    /// Leave the running countdown alone; new durations apply from the next
    /// phase switch.
    #[default]
    NextPhase,
    /// Restart the current phase (stopped) with its new duration.
    CurrentPhase,
}

// ============================================================================
// TimerSnapshot
// ============================================================================

/// Read-only copy of the engine state handed to presentation code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimerSnapshot {
    /// Current phase
    pub phase: Phase,
    /// Seconds left in the current phase
    pub remaining_seconds: u32,
    /// Whether the countdown is advancing
    pub running: bool,
    /// Elapsed fraction of the phase as an angle in [0, 360)
    pub progress_angle_degrees: f64,
    /// Active configuration
    pub configuration: TimerConfiguration,
}

// ============================================================================
// Theme
// ============================================================================

/// Light or dark presentation theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Light background (default)
    #[default]
    Light,
    /// Dark background
    Dark,
}

impl Theme {
    /// Builds a theme from the persisted `darkMode` flag.
    pub fn from_dark_mode(dark_mode: bool) -> Self {
        if dark_mode {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    /// Returns true for the dark theme.
    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }

    /// Returns the other theme.
    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Returns the lowercase theme name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
