//! CLI module for the Pomodoro timer.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `display`: Clock/title formatting and output
//! - `runner`: The interactive `run` loop

pub mod commands;
pub mod display;
pub mod runner;

pub use commands::{
    Cli, Commands, ConfigCommand, ImageCommand, KeyCommand, RunArgs, SoundCommand, ThemeCommand,
};
pub use display::{format_clock, phase_title, window_title, Display};
pub use runner::{apply_key, run_interactive, run_with_input};
