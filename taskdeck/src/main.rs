//! `TaskDeck` — terminal-native task tracker.
//!
//! Launches the TUI and optionally connects to a hosted store server.
//! Configuration via CLI flags, environment variables, or config file
//! (`~/.config/taskdeck/config.toml`).
//!
//! ```bash
//! # Offline demo mode (in-memory store, stub sign-in)
//! cargo run --bin taskdeck
//!
//! # Connect to a hosted store
//! cargo run --bin taskdeck -- --store-url ws://127.0.0.1:9400/ws
//!
//! # Or via environment variables
//! TASKDECK_STORE_URL=ws://127.0.0.1:9400/ws TASKDECK_CREDENTIAL=ada cargo run
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use taskdeck::app::App;
use taskdeck::auth::StubIdentity;
use taskdeck::bridge::{self, UiCommand, UiEvent};
use taskdeck::config::{CliArgs, ClientConfig};
use taskdeck::controller::TaskListController;
use taskdeck::session::SessionHolder;
use taskdeck::store::memory::MemoryStore;
use taskdeck::store::remote::RemoteStore;
use taskdeck::ui;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!("taskdeck starting");

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app.
    let result = run_app(&mut terminal, &config).await;

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("taskdeck exiting");
    result
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the terminal).
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskdeck.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &ClientConfig,
) -> io::Result<()> {
    let mut app = App::new();
    app.timestamp_format.clone_from(&config.timestamp_format);

    let sessions = Arc::new(SessionHolder::new());

    // Connect to the hosted store if configured; the remote adapter serves
    // both the task store and the identity exchange over one connection.
    // Otherwise (or when connecting fails) run the in-memory demo stack.
    let (cmd_tx, mut evt_rx) = if let Some(url) = &config.store_url {
        match RemoteStore::connect(url).await {
            Ok(store) => {
                tracing::info!(url, "connected to hosted store");
                let store = Arc::new(store);
                let controller = Arc::new(TaskListController::new(
                    Arc::clone(&store),
                    Arc::clone(&sessions),
                ));
                bridge::spawn_bridge(controller, store, sessions, config.channel_capacity)
            }
            Err(e) => {
                tracing::warn!(url, err = %e, "store connection failed, using offline demo mode");
                spawn_demo_bridge(&sessions, config.channel_capacity)
            }
        }
    } else {
        spawn_demo_bridge(&sessions, config.channel_capacity)
    };

    // Sign in automatically when a credential is configured.
    if let Some(code) = &config.credential {
        app.signing_in = true;
        let _ = cmd_tx.try_send(UiCommand::SignIn { code: code.clone() });
    }

    loop {
        // Step 1: Draw the UI frame.
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Step 2: Drain all pending UiEvents (non-blocking).
        while let Ok(evt) = evt_rx.try_recv() {
            app.apply_event(evt);
        }

        // Step 3: Poll for terminal input events.
        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if let Some(cmd) = app.handle_key_event(key) {
                match cmd_tx.try_send(cmd) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        tracing::warn!("command channel full, dropping input");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        tracing::warn!("command channel closed");
                    }
                }
            }
        }

        if app.should_quit {
            let _ = cmd_tx.try_send(UiCommand::Shutdown);
            return Ok(());
        }
    }
}

/// Wire up the offline demo stack: in-memory store, stub identity.
fn spawn_demo_bridge(
    sessions: &Arc<SessionHolder>,
    channel_capacity: usize,
) -> (mpsc::Sender<UiCommand>, mpsc::Receiver<UiEvent>) {
    let controller = Arc::new(TaskListController::new(
        Arc::new(MemoryStore::new()),
        Arc::clone(sessions),
    ));
    bridge::spawn_bridge(
        controller,
        Arc::new(StubIdentity::new()),
        Arc::clone(sessions),
        channel_capacity,
    )
}
