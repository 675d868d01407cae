//! # Binary: Live Monitoring TUI
//!
//! ## Responsibility
//! Entry point for the DriftGuard live monitoring dashboard. Loads config,
//! starts the simulated feed and the snapshot poller on a tokio runtime,
//! and runs the draw/input loop on the main thread.
//!
//! ## Usage
//! ```bash
//! cargo run --bin driftguard-tui                                   # defaults
//! cargo run --bin driftguard-tui -- --config driftguard.toml
//! cargo run --bin driftguard-tui -- --api-url http://localhost:5000 --seed 7
//! cargo run --bin driftguard-tui -- --no-poll                      # feed only
//! ```
//!
//! ## Guarantees
//! - Terminal state always restored on exit, even on panic
//! - Clean shutdown on q, Esc, or Ctrl+C; both loops are stopped before exit
//! - A feature-details response is only shown if it is still the one asked for

use std::io;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use parking_lot::Mutex;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::runtime::Runtime;

use driftguard_live::cli::{self, CliArgs, USAGE};
use driftguard_live::config::DriftGuardConfig;
use driftguard_live::poller::PollerState;
use driftguard_live::tui::app::{App, DetailsPanel};
use driftguard_live::tui::events::{apply_event, poll_event, Action};
use driftguard_live::tui::ui;
use driftguard_live::{DriftGuardClient, LiveFeed, PollerHandle, SnapshotPoller};

/// Render refresh rate: 10 frames per second.
const TICK_RATE: Duration = Duration::from_millis(100);

/// Slot a spawned feature-details request writes its result into.
type DetailsSlot = Arc<Mutex<Option<DetailsPanel>>>;

/// Sets up the terminal for TUI rendering.
///
/// # Errors
/// Returns `io::Error` if terminal initialization fails.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>, io::Error> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

/// Restores the terminal to its original state.
///
/// # Errors
/// Returns `io::Error` if the terminal cannot be restored.
fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<(), io::Error> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Everything the draw loop drives.
struct Session {
    feed: LiveFeed,
    poller: Option<PollerHandle>,
    client: Option<DriftGuardClient>,
    details: DetailsSlot,
}

impl Session {
    /// Starts the feed and, if enabled, the poller. Must run inside the runtime.
    fn start(config: &DriftGuardConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let mut feed = LiveFeed::from_config(config);
        feed.start()?;

        let (poller, client) = if config.poller.enabled {
            let poller = SnapshotPoller::from_config(&config.poller)?;
            let client = poller.client().clone();
            (Some(poller.spawn()?), Some(client))
        } else {
            (None, None)
        };

        Ok(Self {
            feed,
            poller,
            client,
            details: Arc::new(Mutex::new(None)),
        })
    }

    fn poller_state(&self) -> PollerState {
        self.poller
            .as_ref()
            .map(PollerHandle::state)
            .unwrap_or_default()
    }

    fn perform(&mut self, app: &mut App, rt: &Runtime, action: Action) {
        match action {
            Action::TogglePlay => match self.feed.toggle() {
                Ok(true) => app.set_status("Live feed resumed"),
                Ok(false) => app.set_status("Live feed paused"),
                Err(e) => app.set_status(format!("Could not resume feed: {e}")),
            },
            Action::Reset => {
                self.feed.reset();
                app.set_status("Simulation reset");
            }
            Action::ForceDrift => {
                self.feed.force_drift();
                app.set_status("Drift forced on");
            }
            Action::Dismiss(id) => {
                if self.feed.dismiss(id) {
                    app.set_status(format!("Dismissed alert {id}"));
                }
            }
            Action::LoadFeature(name) => match &self.client {
                Some(client) => {
                    let client = client.clone();
                    let slot = Arc::clone(&self.details);
                    rt.spawn(async move {
                        let panel = match client.feature_details(&name).await {
                            Ok(details) => DetailsPanel::Loaded { name, details },
                            Err(e) => DetailsPanel::Failed {
                                name,
                                error: e.to_string(),
                            },
                        };
                        *slot.lock() = Some(panel);
                    });
                }
                None => {
                    app.details = DetailsPanel::Failed {
                        name,
                        error: "backend polling is disabled".to_string(),
                    };
                }
            },
        }
    }

    /// Moves a finished details response into the app if it answers the
    /// request still on screen.
    fn collect_details(&self, app: &mut App) {
        let Some(panel) = self.details.lock().take() else {
            return;
        };
        let answered = match &panel {
            DetailsPanel::Loaded { name, .. } | DetailsPanel::Failed { name, .. } => name,
            DetailsPanel::Idle | DetailsPanel::Loading(_) => return,
        };
        if matches!(&app.details, DetailsPanel::Loading(pending) if pending == answered) {
            app.details = panel;
        }
    }

    fn shutdown(&mut self) {
        self.feed.stop();
        if let Some(poller) = self.poller.as_mut() {
            poller.stop();
        }
    }
}

/// Runs the draw/input loop until the user quits.
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    session: &mut Session,
    rt: &Runtime,
    poll_enabled: bool,
) -> Result<(), io::Error> {
    let mut app = App::new(session.feed.snapshot(), poll_enabled);

    loop {
        app.refresh(session.feed.snapshot(), session.poller_state(), Utc::now());
        session.collect_details(&mut app);

        terminal.draw(|f| ui::draw(f, &app))?;

        let input = poll_event(TICK_RATE);
        if let Some(action) = apply_event(&mut app, input) {
            session.perform(&mut app, rt, action);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn parse_cli() -> CliArgs {
    match cli::parse_args(std::env::args().skip(1)) {
        Ok(args) if args.help => {
            println!("Usage: driftguard-tui [OPTIONS]\n\n{USAGE}");
            std::process::exit(0);
        }
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}\n\nUsage: driftguard-tui [OPTIONS]\n\n{USAGE}");
            std::process::exit(2);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_cli();

    if args.print_schema {
        println!("{}", driftguard_live::config::export_schema()?);
        return Ok(());
    }

    let config = cli::load_config(&args)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;
    let _guard = rt.enter();

    let mut session = Session::start(&config)?;

    // Install panic hook that restores terminal before printing panic message
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut session, &rt, config.poller.enabled);

    session.shutdown();
    restore_terminal(&mut terminal)?;

    if let Err(e) = result {
        eprintln!("TUI error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
