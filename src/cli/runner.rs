//! Interactive timer loop for the `run` command.
//!
//! Reads single-letter commands line by line while printing the title for
//! every engine event. Stops on `q`, end of input or Ctrl-C.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use super::commands::KeyCommand;
use super::display::{window_title, Display};
use crate::engine::TimerEvent;
use crate::session::Session;
use crate::sound::SoundPlayer;

/// Runs the interactive loop on standard input.
pub async fn run_interactive(
    session: &mut Session,
    events: &mut mpsc::UnboundedReceiver<TimerEvent>,
    player: Option<&dyn SoundPlayer>,
) -> Result<()> {
    let input = BufReader::new(tokio::io::stdin());
    run_with_input(session, events, player, input).await
}

/// Runs the interactive loop reading commands from `input`.
pub async fn run_with_input<R>(
    session: &mut Session,
    events: &mut mpsc::UnboundedReceiver<TimerEvent>,
    player: Option<&dyn SoundPlayer>,
    input: R,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    Display::show_run_help();
    let snapshot = session.snapshot().await;
    Display::show_title(&window_title(snapshot.remaining_seconds, snapshot.phase));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read command input")? else {
                    debug!("Input closed");
                    break;
                };
                match KeyCommand::parse(&line) {
                    Some(KeyCommand::Quit) => break,
                    Some(command) => apply_key(session, command).await,
                    None if line.trim().is_empty() => {}
                    None => Display::show_warning(&format!("Unknown command: {}", line.trim())),
                }
            }
            Some(event) = events.recv() => {
                if let Some(title) = session.handle_event(&event, player) {
                    Display::show_title(&title);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted");
                break;
            }
        }
    }

    session.pause().await;
    // Show anything the last commands produced.
    while let Ok(event) = events.try_recv() {
        if let Some(title) = session.handle_event(&event, player) {
            Display::show_title(&title);
        }
    }
    Ok(())
}

/// Applies one key command to the session.
pub async fn apply_key(session: &mut Session, command: KeyCommand) {
    match command {
        KeyCommand::Toggle => {
            session.toggle().await;
        }
        KeyCommand::Reset => session.reset().await,
        KeyCommand::Skip => session.skip().await,
        KeyCommand::Help => Display::show_run_help(),
        KeyCommand::Quit => {}
    }
}

// ============================================================================
// Tests
// ============================================================================
