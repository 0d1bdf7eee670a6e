//! Pomodoro timer shell
//!
//! Alternates focus and break countdowns in the terminal:
//! - 60 minutes of focus, 5 minutes of break by default
//! - A notification sound when a phase runs out
//! - Durations, sound, background images and theme remembered between runs

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use tokio::sync::mpsc;

use pomodoro_engine::cli::{
    run_interactive, Cli, Commands, ConfigCommand, Display, ImageCommand, RunArgs, SoundCommand,
    ThemeCommand,
};
use pomodoro_engine::engine::{EngineError, TimerEvent};
use pomodoro_engine::preferences::{FilePreferenceStore, PreferenceError, Preferences};
use pomodoro_engine::session::Session;
use pomodoro_engine::sound::{try_create_player, NotificationCatalog, SoundError, SoundPlayer};
use pomodoro_engine::types::{ApplyTo, Theme, TimerConfiguration};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        if let Some(hint) = suggestion_for(&e) {
            Display::show_hint(hint);
        }
        std::process::exit(1);
    }
}

/// Finds a hint for the first library error in the chain.
fn suggestion_for(err: &anyhow::Error) -> Option<&'static str> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<EngineError>() {
            Some(e.suggestion())
        } else if let Some(e) = cause.downcast_ref::<PreferenceError>() {
            Some(e.suggestion())
        } else {
            cause.downcast_ref::<SoundError>().map(SoundError::suggestion)
        }
    })
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let Some(command) = cli.command else {
        // No command provided, show help
        Cli::command().print_help()?;
        return Ok(());
    };
    let data_dir = cli.data_dir;

    match command {
        Commands::Run(args) => {
            let (mut session, mut event_rx) =
                open_session(data_dir, NotificationCatalog::discover());
            run(&mut session, &mut event_rx, &args).await?;
        }
        Commands::Config(command) => {
            let (mut session, _) = open_session(data_dir, NotificationCatalog::builtin());
            execute_config(&mut session, command).await?;
        }
        Commands::Sound(command) => {
            let (mut session, _) = open_session(data_dir, NotificationCatalog::discover());
            execute_sound(&mut session, command)?;
        }
        Commands::Image(command) => {
            let (session, _) = open_session(data_dir, NotificationCatalog::builtin());
            execute_image(&session, command)?;
        }
        Commands::Theme(command) => {
            let (mut session, _) = open_session(data_dir, NotificationCatalog::builtin());
            execute_theme(&mut session, command)?;
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
    }

    Ok(())
}

/// Opens a session on the preference directory (or the platform default).
fn open_session(
    data_dir: Option<PathBuf>,
    catalog: NotificationCatalog,
) -> (Session, mpsc::UnboundedReceiver<TimerEvent>) {
    let preferences = match data_dir {
        Some(dir) => Preferences::new(FilePreferenceStore::new(dir)),
        None => Preferences::open_default(),
    };
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    (Session::open(preferences, catalog, event_tx), event_rx)
}

/// Runs the interactive timer.
async fn run(
    session: &mut Session,
    event_rx: &mut mpsc::UnboundedReceiver<TimerEvent>,
    args: &RunArgs,
) -> Result<()> {
    if args.focus.is_some() || args.break_seconds.is_some() {
        let config = merge_durations(session, args.focus, args.break_seconds).await?;
        session
            .configure(config, ApplyTo::CurrentPhase)
            .await
            .context("Invalid timer durations")?;
    }

    let player = if args.mute {
        None
    } else {
        try_create_player(false)
    };
    let player = player.as_ref().map(|p| p as &dyn SoundPlayer);

    run_interactive(session, event_rx, player).await?;
    warn_if_not_saved(session);
    Ok(())
}

async fn execute_config(session: &mut Session, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            Display::show_configuration(&session.snapshot().await.configuration);
        }
        ConfigCommand::Set {
            focus,
            break_seconds,
        } => {
            if focus.is_none() && break_seconds.is_none() {
                bail!("Nothing to change; pass --focus and/or --break");
            }
            let config = merge_durations(session, focus, break_seconds).await?;
            session
                .configure(config, ApplyTo::NextPhase)
                .await
                .context("Invalid timer durations")?;
            ensure_saved(session)?;
            Display::show_configuration_saved(&config);
        }
    }
    Ok(())
}

fn execute_sound(session: &mut Session, command: SoundCommand) -> Result<()> {
    match command {
        SoundCommand::List => {
            Display::show_sound_list(session.catalog(), session.sound_selection());
        }
        SoundCommand::Select { name } => {
            let entry = session
                .select_sound(&name)
                .with_context(|| format!("No notification sound named '{}'", name))?;
            ensure_saved(session)?;
            Display::show_sound_selected(Some(&entry.name));
        }
        SoundCommand::Clear => {
            session.clear_sound();
            ensure_saved(session)?;
            Display::show_sound_selected(None);
        }
    }
    Ok(())
}

fn execute_image(session: &Session, command: ImageCommand) -> Result<()> {
    match command {
        ImageCommand::Show => {
            Display::show_images(&session.background_images());
        }
        ImageCommand::Set { position, uri } => {
            session
                .set_background_image(position, Some(uri))
                .with_context(|| format!("Cannot set the {} image", position))?;
            ensure_saved(session)?;
            Display::show_image_updated(position, true);
        }
        ImageCommand::Clear { position } => {
            session.set_background_image(position, None)?;
            ensure_saved(session)?;
            Display::show_image_updated(position, false);
        }
    }
    Ok(())
}

fn execute_theme(session: &mut Session, command: ThemeCommand) -> Result<()> {
    let theme = match command {
        ThemeCommand::Show => session.theme(),
        ThemeCommand::Dark => {
            session.set_theme(Theme::Dark);
            Theme::Dark
        }
        ThemeCommand::Light => {
            session.set_theme(Theme::Light);
            Theme::Light
        }
        ThemeCommand::Toggle => session.toggle_theme(),
    };
    if command != ThemeCommand::Show {
        ensure_saved(session)?;
    }
    Display::show_theme(theme);
    Ok(())
}

/// Overlays the given durations on the session's current ones.
async fn merge_durations(
    session: &Session,
    focus: Option<u32>,
    break_seconds: Option<u32>,
) -> Result<TimerConfiguration> {
    let current = session.snapshot().await.configuration;
    let config = TimerConfiguration::new(
        focus.unwrap_or(current.focus_seconds),
        break_seconds.unwrap_or(current.break_seconds),
    )?;
    Ok(config)
}

/// Fails a one-shot command whose change only reached memory.
fn ensure_saved(session: &Session) -> Result<()> {
    if session.preferences().is_degraded() {
        bail!("Preferences could not be saved; the change was not kept");
    }
    Ok(())
}

fn warn_if_not_saved(session: &Session) {
    if session.preferences().is_degraded() {
        Display::show_warning("Preferences could not be saved during this run");
    }
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
