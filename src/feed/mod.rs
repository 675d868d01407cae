//! # Module: Live Feed
//!
//! ## Responsibility
//! Own the simulated side of the live view: metric state, alert feed,
//! injected RNG and the tick scheduler that drives them. Expose explicit
//! start/stop so the owning view controls the loop's lifetime.
//!
//! ## Guarantees
//! - One mutex guards all simulated state; a tick holds it for exactly one
//!   step, readers hold it only long enough to clone a snapshot
//! - Deterministic for a configured seed; OS entropy otherwise
//! - Stopping (or dropping) the feed guarantees no further tick mutates state
//!
//! ## NOT Responsible For
//! - Remote snapshots (that belongs to `poller`)
//! - Rendering (that belongs to `tui`)

pub mod alerts;
pub mod ring;
pub mod scheduler;
pub mod simulator;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::api::FetchError;
use crate::config::{AlertConfig, DriftGuardConfig, FeedConfig};
use alerts::{AlertCatalog, AlertEvent, AlertFeed, AlertId, SeverityCounts};
use scheduler::TickScheduler;
use simulator::{MetricSimulator, MetricState};

/// Errors starting the feed's background loops.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A periodic timer was asked to fire every 0 ms.
    #[error("tick interval must be greater than zero")]
    ZeroInterval,

    /// No Tokio runtime is available to host the timer.
    #[error("no Tokio runtime available; start the feed from within a runtime")]
    NoRuntime,

    /// The backend client could not be constructed.
    #[error("backend client: {0}")]
    Client(#[from] FetchError),
}

/// Result of one simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// Tick counter after the step.
    pub tick: u64,
    /// Alert emitted during the step, if any.
    pub alert: Option<AlertId>,
}

/// Cloned, render-ready view of the feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedSnapshot {
    /// Metric channels, counters and drift flag.
    pub metrics: MetricState,
    /// Alerts, newest first.
    pub alerts: Vec<AlertEvent>,
    /// Alert counts per severity.
    pub alert_counts: SeverityCounts,
    /// Time of the last tick (or of construction).
    pub last_update: DateTime<Utc>,
    /// Whether the tick scheduler is running.
    pub playing: bool,
}

/// Everything a tick touches, behind one lock.
#[derive(Debug)]
struct FeedCore {
    simulator: MetricSimulator,
    catalog: AlertCatalog,
    metrics: MetricState,
    alerts: AlertFeed,
    rng: StdRng,
    last_update: DateTime<Utc>,
}

impl FeedCore {
    fn build(feed: &FeedConfig, alert_config: &AlertConfig, now: DateTime<Utc>) -> Self {
        let mut rng = match feed.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let simulator = MetricSimulator::from_config(feed);
        let mut metrics = MetricState::from_config(feed);
        if feed.warm_up {
            metrics = simulator.warm_up(&metrics, feed.history_len.saturating_sub(1), &mut rng);
        }
        Self {
            simulator,
            catalog: AlertCatalog::from_config(alert_config),
            metrics,
            alerts: AlertFeed::from_config(alert_config, now),
            rng,
            last_update: now,
        }
    }

    fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        self.metrics = self.simulator.step(&self.metrics, &mut self.rng);
        let alert = self.alerts.maybe_emit(&self.catalog, now, &mut self.rng);
        self.last_update = now;
        TickOutcome {
            tick: self.metrics.tick,
            alert,
        }
    }
}

/// State holder for the simulated half of the live view.
///
/// # Example
///
/// ```rust,no_run
/// use driftguard_live::{DriftGuardConfig, LiveFeed};
///
/// # async fn example() -> Result<(), driftguard_live::FeedError> {
/// let mut feed = LiveFeed::from_config(&DriftGuardConfig::default());
/// feed.start()?;
/// let snapshot = feed.snapshot();
/// println!("predictions: {}", snapshot.metrics.predictions_total);
/// feed.stop();
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct LiveFeed {
    feed_config: FeedConfig,
    alert_config: AlertConfig,
    core: Arc<Mutex<FeedCore>>,
    scheduler: TickScheduler,
}

impl LiveFeed {
    /// Builds a stopped feed from its two configuration sections.
    pub fn new(feed_config: FeedConfig, alert_config: AlertConfig) -> Self {
        let core = FeedCore::build(&feed_config, &alert_config, Utc::now());
        Self {
            feed_config,
            alert_config,
            core: Arc::new(Mutex::new(core)),
            scheduler: TickScheduler::new(),
        }
    }

    /// Builds a stopped feed from the full configuration.
    pub fn from_config(config: &DriftGuardConfig) -> Self {
        Self::new(config.feed.clone(), config.alerts.clone())
    }

    /// Starts ticking every `feed.tick_interval_ms`. Restarting replaces the
    /// running timer.
    ///
    /// # Errors
    /// [`FeedError::ZeroInterval`] or [`FeedError::NoRuntime`].
    pub fn start(&mut self) -> Result<(), FeedError> {
        let core = Arc::clone(&self.core);
        self.scheduler
            .start(self.feed_config.tick_interval(), move || {
                let outcome = core.lock().tick(Utc::now());
                debug!(tick = outcome.tick, alert = ?outcome.alert, "feed tick");
            })?;
        info!(
            interval_ms = self.feed_config.tick_interval_ms,
            "live feed started"
        );
        Ok(())
    }

    /// Stops ticking. Idempotent.
    pub fn stop(&mut self) {
        if self.scheduler.is_running() {
            self.scheduler.stop();
            info!("live feed paused");
        }
    }

    /// Flips between playing and paused. Returns the new playing state.
    ///
    /// # Errors
    /// Propagates [`LiveFeed::start`] errors when resuming.
    pub fn toggle(&mut self) -> Result<bool, FeedError> {
        if self.is_playing() {
            self.stop();
        } else {
            self.start()?;
        }
        Ok(self.is_playing())
    }

    /// Whether the tick scheduler is running.
    pub fn is_playing(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Applies one step synchronously, independent of the scheduler.
    pub fn tick_now(&self, now: DateTime<Utc>) -> TickOutcome {
        self.core.lock().tick(now)
    }

    /// Dismisses an alert. Absent ids are a no-op.
    pub fn dismiss(&self, id: AlertId) -> bool {
        let removed = self.core.lock().alerts.dismiss(id);
        if removed {
            debug!(alert_id = id.0, "alert dismissed");
        }
        removed
    }

    /// Switches the drift bias on for every channel from the next tick.
    pub fn force_drift(&self) {
        self.core.lock().metrics.force_drift();
    }

    /// Rebuilds metrics, alerts and RNG from configuration. The play state is
    /// kept; a configured seed replays the same sequence.
    pub fn reset(&self) {
        let fresh = FeedCore::build(&self.feed_config, &self.alert_config, Utc::now());
        *self.core.lock() = fresh;
        info!("live feed reset");
    }

    /// Clones the current state for rendering.
    pub fn snapshot(&self) -> FeedSnapshot {
        let core = self.core.lock();
        FeedSnapshot {
            metrics: core.metrics.clone(),
            alerts: core.alerts.events().cloned().collect(),
            alert_counts: core.alerts.counts(),
            last_update: core.last_update,
            playing: self.scheduler.is_running(),
        }
    }

    /// Feed configuration in use.
    pub fn config(&self) -> &FeedConfig {
        &self.feed_config
    }
}
