//! Headless runner for driftguard-live.
//!
//! Drives the simulated feed and the snapshot poller without a terminal UI
//! and reports through tracing. With `--ticks N` it steps the simulation N
//! times synchronously, prints the final feed snapshot as JSON and exits;
//! otherwise it runs live until Ctrl+C.
//!
//! ## Environment Variables
//!
//! - `LOG_FORMAT=json` — structured JSON output (overrides `observability.log_format`)
//! - `RUST_LOG=info` — log level filter

use chrono::Utc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use driftguard_live::cli::{self, CliArgs, USAGE};
use driftguard_live::config::DriftGuardConfig;
use driftguard_live::feed::alerts::AlertId;
use driftguard_live::feed::FeedSnapshot;
use driftguard_live::{init_tracing_with, LiveFeed, LogFormat, PollStatus, SnapshotPoller};

fn parse_cli() -> CliArgs {
    match cli::parse_args(std::env::args().skip(1)) {
        Ok(args) if args.help => {
            println!("Usage: driftguard [OPTIONS]\n\n{USAGE}");
            std::process::exit(0);
        }
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}\n\nUsage: driftguard [OPTIONS]\n\n{USAGE}");
            std::process::exit(2);
        }
    }
}

/// Logs every alert newer than `seen` and returns the newest id.
fn log_new_alerts(snapshot: &FeedSnapshot, seen: Option<AlertId>) -> Option<AlertId> {
    // Alerts are newest first; walk oldest-to-newest so logs read in order.
    for alert in snapshot.alerts.iter().rev() {
        if seen.map_or(true, |s| alert.id > s) {
            info!(
                alert_id = alert.id.0,
                severity = %alert.severity,
                message = %alert.message,
                "alert"
            );
        }
    }
    snapshot.alerts.iter().map(|a| a.id).max().max(seen)
}

/// Steps the feed `ticks` times without a scheduler and prints the result.
async fn run_fixed(config: &DriftGuardConfig, ticks: u64) -> Result<(), Box<dyn std::error::Error>> {
    let feed = LiveFeed::from_config(config);
    let mut seen = log_new_alerts(&feed.snapshot(), None);

    for _ in 0..ticks {
        let outcome = feed.tick_now(Utc::now());
        if outcome.alert.is_some() {
            seen = log_new_alerts(&feed.snapshot(), seen);
        }
    }

    if config.poller.enabled {
        let poller = SnapshotPoller::from_config(&config.poller)?;
        poller.poll_once().await;
        let state = poller.state();
        match (state.status(), state.snapshot.as_ref()) {
            (PollStatus::Ready, Some(snapshot)) => info!(
                health = snapshot.health_score,
                label = snapshot.health_label(),
                drifting = snapshot.drift_summary.drifting_count,
                "backend snapshot"
            ),
            _ => warn!(
                error = state.error.as_deref().unwrap_or("unknown"),
                "backend snapshot unavailable"
            ),
        }
    }

    let snapshot = feed.snapshot();
    info!(
        ticks = snapshot.metrics.tick,
        predictions = snapshot.metrics.predictions_total,
        alerts = snapshot.alerts.len(),
        "fixed run complete"
    );
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

/// Runs the feed and poller until Ctrl+C, logging a summary every tick.
async fn run_live(config: &DriftGuardConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut feed = LiveFeed::from_config(config);
    feed.start()?;

    let mut poller = if config.poller.enabled {
        Some(SnapshotPoller::from_config(&config.poller)?.spawn()?)
    } else {
        info!("backend polling disabled");
        None
    };

    let mut report = interval(config.feed.tick_interval());
    report.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut seen = None;
    let mut last_poll: Option<PollStatus> = None;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
            _ = report.tick() => {
                let snapshot = feed.snapshot();
                seen = log_new_alerts(&snapshot, seen);
                info!(
                    tick = snapshot.metrics.tick,
                    predictions = snapshot.metrics.predictions_total,
                    drift_active = snapshot.metrics.drift_active,
                    alerts = snapshot.alert_counts.total(),
                    critical = snapshot.alert_counts.critical,
                    "feed"
                );

                if let Some(handle) = poller.as_ref() {
                    let state = handle.state();
                    let status = state.status();
                    if last_poll != Some(status) {
                        match status {
                            PollStatus::Error => warn!(
                                error = state.error.as_deref().unwrap_or("unknown"),
                                "backend unreachable"
                            ),
                            _ => info!(status = ?status, stale = state.is_stale(), "backend status"),
                        }
                        last_poll = Some(status);
                    }
                }
            }
        }
    }

    feed.stop();
    if let Some(handle) = poller.as_mut() {
        handle.stop();
    }
    info!("driftguard stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_cli();

    if args.print_schema {
        println!("{}", driftguard_live::config::export_schema()?);
        return Ok(());
    }

    let config = cli::load_config(&args)?;

    // LOG_FORMAT overrides the config file.
    let _ = init_tracing_with(LogFormat::from_env().unwrap_or(config.observability.log_format));

    info!(
        tick_interval_ms = config.feed.tick_interval_ms,
        seed = ?config.feed.seed,
        backend = %config.poller.base_url,
        polling = config.poller.enabled,
        "starting driftguard"
    );

    match args.ticks {
        Some(ticks) => run_fixed(&config, ticks).await,
        None => run_live(&config).await,
    }
}
