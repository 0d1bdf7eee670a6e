//! Command definitions for the Pomodoro timer shell.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::preferences::ImagePosition;

// ============================================================================
// CLI Structure
// ============================================================================

/// Pomodoro timer with persisted preferences
#[derive(Parser, Debug)]
#[command(
    name = "pomodoro-engine",
    version,
    about = "Focus/break countdown timer",
    long_about = "A focus/break countdown timer for the terminal.\n\
                  Durations, notification sound, background images and theme are \
                  remembered between runs.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding the preference files
    #[arg(long, global = true, env = "POMODORO_DATA_DIR", value_name = "PATH")]
    pub data_dir: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the timer interactively
    Run(RunArgs),

    /// Show or change the phase durations
    #[command(subcommand)]
    Config(ConfigCommand),

    /// List or choose the notification sound
    #[command(subcommand)]
    Sound(SoundCommand),

    /// Show or change the background images
    #[command(subcommand)]
    Image(ImageCommand),

    /// Show or change the theme
    #[command(subcommand)]
    Theme(ThemeCommand),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Run Command Arguments
// ============================================================================

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Focus duration in seconds for this run (saved for later runs)
    #[arg(
        short,
        long,
        value_name = "SECS",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub focus: Option<u32>,

    /// Break duration in seconds for this run (saved for later runs)
    #[arg(
        short,
        long = "break",
        value_name = "SECS",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub break_seconds: Option<u32>,

    /// Disable notification sounds
    #[arg(short, long)]
    pub mute: bool,
}

// ============================================================================
// Preference Subcommands
// ============================================================================

/// Duration settings
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Show the saved durations
    Show,
    /// Save new durations; unspecified values are kept
    Set {
        /// Focus duration in seconds
        #[arg(
            long,
            value_name = "SECS",
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        focus: Option<u32>,

        /// Break duration in seconds
        #[arg(
            long = "break",
            value_name = "SECS",
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        break_seconds: Option<u32>,
    },
}

/// Notification sound settings
#[derive(Subcommand, Debug, Clone)]
pub enum SoundCommand {
    /// List available sounds; the selected one is marked with `*`
    List,
    /// Select a sound by name
    Select {
        /// Sound name as shown by `sound list`
        name: String,
    },
    /// Play no sound at phase completion
    Clear,
}

/// Background image settings
#[derive(Subcommand, Debug, Clone)]
pub enum ImageCommand {
    /// Show which positions have an image
    Show,
    /// Set the image at a position
    Set {
        /// top, bottom, left or right
        position: ImagePosition,
        /// Image as a `data:image/...` URI
        #[arg(value_name = "DATA_URI")]
        uri: String,
    },
    /// Remove the image at a position
    Clear {
        /// top, bottom, left or right
        position: ImagePosition,
    },
}

/// Theme settings
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeCommand {
    /// Show the saved theme
    Show,
    /// Use the dark theme
    Dark,
    /// Use the light theme
    Light,
    /// Switch between light and dark
    Toggle,
}

// ============================================================================
// Interactive Key Commands
// ============================================================================

/// A single-letter command typed during `run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// `s`: start or pause
    Toggle,
    /// `r`: reset to a full focus phase
    Reset,
    /// `n`: skip to the next phase
    Skip,
    /// `q`: quit
    Quit,
    /// `?` or `h`: show key bindings
    Help,
}

impl KeyCommand {
    /// Parses one input line. Surrounding whitespace and case are ignored.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "s" | "start" | "pause" => Some(Self::Toggle),
            "r" | "reset" => Some(Self::Reset),
            "n" | "next" | "skip" => Some(Self::Skip),
            "q" | "quit" | "exit" => Some(Self::Quit),
            "?" | "h" | "help" => Some(Self::Help),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
