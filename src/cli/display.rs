//! Display utilities for the Pomodoro timer shell.
//!
//! This module provides formatted output for:
//! - The `MM:SS` clock and window title
//! - Timer status and configuration
//! - Notification sounds, background images and theme
//! - Error messages

use crate::preferences::{BackgroundImageSet, ImagePosition};
use crate::sound::{NotificationCatalog, NotificationSoundSelection};
use crate::types::{Phase, Theme, TimerConfiguration, TimerSnapshot};

/// Formats seconds as zero-padded `MM:SS`. Minutes are not capped at 99.
pub fn format_clock(total_seconds: u32) -> String {
    let (minutes, seconds) = split_minutes(total_seconds);
    format!("{:02}:{:02}", minutes, seconds)
}

/// Window title shown while a phase is counting, e.g. `59:59 - Focus`.
pub fn window_title(remaining_seconds: u32, phase: Phase) -> String {
    format!("{} - {}", format_clock(remaining_seconds), phase.label())
}

/// Title shown at a phase boundary, e.g. `Break Timer`.
pub fn phase_title(phase: Phase) -> String {
    format!("{} Timer", phase.label())
}

fn split_minutes(total_seconds: u32) -> (u32, u32) {
    (total_seconds / 60, total_seconds % 60)
}

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the current timer status.
    pub fn show_status(snapshot: &TimerSnapshot) {
        let state = if snapshot.running { "running" } else { "stopped" };
        println!(
            "{} [{}] {:.1}°",
            window_title(snapshot.remaining_seconds, snapshot.phase),
            state,
            snapshot.progress_angle_degrees
        );
    }

    /// Shows a title line in the interactive loop.
    pub fn show_title(title: &str) {
        println!("{}", title);
    }

    /// Shows the key bindings of the interactive loop.
    pub fn show_run_help() {
        println!("Commands: [s] start/pause  [r] reset  [n] skip  [q] quit");
    }

    /// Shows the phase durations.
    pub fn show_configuration(config: &TimerConfiguration) {
        println!("Timer durations");
        println!("─────────────────────────────");
        println!("Focus: {}", format_clock(config.focus_seconds));
        println!("Break: {}", format_clock(config.break_seconds));
    }

    /// Shows a success message for a duration change.
    pub fn show_configuration_saved(config: &TimerConfiguration) {
        println!(
            "* Saved durations (focus {}, break {})",
            format_clock(config.focus_seconds),
            format_clock(config.break_seconds)
        );
    }

    /// Lists the catalog, marking the selected entry.
    pub fn show_sound_list(catalog: &NotificationCatalog, selection: &NotificationSoundSelection) {
        let selected = selection.reference();
        for entry in catalog.list() {
            let marker = if Some(&entry.reference) == selected { "*" } else { " " };
            println!("{} {}", marker, entry.name);
        }
        if selected.is_none() {
            println!("(no notification sound selected)");
        }
    }

    /// Shows a success message for a sound choice.
    pub fn show_sound_selected(name: Option<&str>) {
        match name {
            Some(name) => println!("* Notification sound: {}", name),
            None => println!("* Notification sound cleared"),
        }
    }

    /// Shows which background images are set.
    pub fn show_images(images: &BackgroundImageSet) {
        for position in ImagePosition::ALL {
            match images.get(position) {
                Some(uri) => println!("{:<6} uploaded ({} bytes)", position.as_str(), uri.len()),
                None => println!("{:<6} -", position.as_str()),
            }
        }
    }

    /// Shows a success message for an image change.
    pub fn show_image_updated(position: ImagePosition, uploaded: bool) {
        if uploaded {
            println!("* Background image set: {}", position);
        } else {
            println!("* Background image cleared: {}", position);
        }
    }

    /// Shows the current theme.
    pub fn show_theme(theme: Theme) {
        println!("Theme: {}", theme.as_str());
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    /// Shows a hint below an error.
    pub fn show_hint(hint: &str) {
        eprintln!("  Hint: {}", hint);
    }

    /// Shows a non-fatal warning.
    pub fn show_warning(message: &str) {
        eprintln!("Warning: {}", message);
    }
}

// ============================================================================
// Tests
// ============================================================================
