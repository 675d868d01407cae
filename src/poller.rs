//! # Module: Remote Snapshot Poller
//!
//! ## Responsibility
//! Fetch the authoritative dashboard snapshot from the backend immediately on
//! activation and then on a fixed interval, exposing a loading / ready /
//! error tri-state to the view.
//!
//! ## Guarantees
//! - Stale-but-available: a failed fetch never discards the last good snapshot
//! - Every failure (network, non-2xx, malformed body) sets a human-readable
//!   error; none is fatal and polling continues
//! - `stop` is idempotent; a fetch that completes after `stop` returns is
//!   discarded under a liveness lock
//! - Non-blocking: runs as a background task, no lock is held across `.await`
//!
//! ## NOT Responsible For
//! - Decoding details (that belongs to `api`)
//! - Simulated metrics (that belongs to `feed`)

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::api::{DashboardSnapshot, DriftGuardClient, FetchError};
use crate::config::{BackoffConfig, PollerConfig};
use crate::feed::FeedError;

/// Message shown when the backend cannot be reached or decoded.
pub const UNAVAILABLE_MESSAGE: &str = "Could not load dashboard data. Ensure backend is running.";

/// Consecutive failures after which logging escalates from WARN to ERROR.
const ESCALATE_AFTER: u32 = 5;

/// What the view should show for the remote half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    /// No snapshot yet and no failed attempt yet.
    Loading,
    /// A snapshot is available (possibly stale, see [`PollerState::is_stale`]).
    Ready,
    /// No snapshot yet and the last attempt failed.
    Error,
}

/// Everything the poller knows, cloned out for rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollerState {
    /// Last good snapshot.
    pub snapshot: Option<DashboardSnapshot>,
    /// Error of the most recent attempt, cleared on success.
    pub error: Option<String>,
    /// Time of the last successful fetch.
    pub last_success: Option<DateTime<Utc>>,
    /// Time of the last attempt, successful or not.
    pub last_attempt: Option<DateTime<Utc>>,
    /// Failures since the last success.
    pub consecutive_failures: u32,
    /// Attempts made so far.
    pub attempts: u64,
}

impl PollerState {
    /// Folds one fetch result into the state.
    pub fn apply(&mut self, result: Result<DashboardSnapshot, FetchError>, now: DateTime<Utc>) {
        self.attempts = self.attempts.saturating_add(1);
        self.last_attempt = Some(now);
        match result {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                self.error = None;
                self.last_success = Some(now);
                self.consecutive_failures = 0;
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            }
        }
    }

    /// Current tri-state.
    pub fn status(&self) -> PollStatus {
        match (&self.snapshot, &self.error) {
            (Some(_), _) => PollStatus::Ready,
            (None, Some(_)) => PollStatus::Error,
            (None, None) => PollStatus::Loading,
        }
    }

    /// A snapshot is shown but the latest attempt failed.
    pub fn is_stale(&self) -> bool {
        self.snapshot.is_some() && self.error.is_some()
    }

    /// Banner text for the view, if any error should be surfaced.
    pub fn banner(&self) -> Option<String> {
        self.error
            .as_ref()
            .map(|detail| format!("{UNAVAILABLE_MESSAGE} ({detail})"))
    }
}

/// Delay before the next poll after `failures` consecutive failures.
///
/// With backoff disabled (or no failures) this is always `interval`.
pub fn next_delay(interval: Duration, backoff: &BackoffConfig, failures: u32) -> Duration {
    if !backoff.enabled || failures == 0 {
        return interval;
    }
    let exponent = i32::try_from(failures).unwrap_or(i32::MAX);
    let scaled = interval.as_millis() as f64 * backoff.multiplier.powi(exponent);
    let capped = scaled.min(backoff.max_interval_ms as f64).max(interval.as_millis() as f64);
    Duration::from_millis(capped as u64)
}

/// Periodic fetcher of `/api/dashboard-data`.
#[derive(Debug, Clone)]
pub struct SnapshotPoller {
    client: DriftGuardClient,
    interval: Duration,
    backoff: BackoffConfig,
    state: Arc<RwLock<PollerState>>,
}

impl SnapshotPoller {
    /// Creates a poller around an existing client.
    pub fn new(client: DriftGuardClient, config: &PollerConfig) -> Self {
        Self {
            client,
            interval: config.interval(),
            backoff: config.backoff.clone(),
            state: Arc::new(RwLock::new(PollerState::default())),
        }
    }

    /// Creates a poller and its client from configuration.
    ///
    /// # Errors
    /// [`FeedError::Client`] if the base URL is unusable.
    pub fn from_config(config: &PollerConfig) -> Result<Self, FeedError> {
        let client = DriftGuardClient::from_config(config)?;
        Ok(Self::new(client, config))
    }

    /// The client used for fetches; clones share its connection pool.
    pub fn client(&self) -> &DriftGuardClient {
        &self.client
    }

    /// Clone of the current state.
    pub fn state(&self) -> PollerState {
        self.state.read().clone()
    }

    /// Performs one fetch and applies it. Returns the resulting status.
    pub async fn poll_once(&self) -> PollStatus {
        let result = self.client.dashboard().await;
        let mut state = self.state.write();
        log_result(&result, state.consecutive_failures, self.client.base_url().as_str());
        state.apply(result, Utc::now());
        state.status()
    }

    /// Starts polling in the background: once immediately, then after every
    /// interval (stretched by backoff when enabled).
    ///
    /// # Errors
    /// [`FeedError::ZeroInterval`] or [`FeedError::NoRuntime`].
    pub fn spawn(self) -> Result<PollerHandle, FeedError> {
        if self.interval.is_zero() {
            return Err(FeedError::ZeroInterval);
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| FeedError::NoRuntime)?;

        let alive = Arc::new(Mutex::new(true));
        let task_alive = Arc::clone(&alive);
        let state = Arc::clone(&self.state);
        let interval = self.interval;

        let task = runtime.spawn(async move {
            // First tick completes immediately; later ticks keep a fixed cadence
            // measured from fetch start, not fetch end.
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let result = self.client.dashboard().await;
                let failures = {
                    let alive = task_alive.lock();
                    if !*alive {
                        break;
                    }
                    let mut state = self.state.write();
                    log_result(&result, state.consecutive_failures, self.client.base_url().as_str());
                    state.apply(result, Utc::now());
                    state.consecutive_failures
                };
                let delay = next_delay(self.interval, &self.backoff, failures);
                if delay > self.interval {
                    tokio::time::sleep(delay - self.interval).await;
                    ticker.reset();
                }
            }
        });

        info!(interval_ms = interval.as_millis() as u64, "snapshot poller started");
        Ok(PollerHandle {
            alive,
            task: Some(task),
            state,
        })
    }
}

fn log_result(result: &Result<DashboardSnapshot, FetchError>, prior_failures: u32, url: &str) {
    match result {
        Ok(snapshot) => {
            if prior_failures > 0 {
                info!(
                    url,
                    health_score = snapshot.health_score,
                    after_failures = prior_failures,
                    "backend reachable again"
                );
            } else {
                info!(url, health_score = snapshot.health_score, "dashboard snapshot updated");
            }
        }
        Err(e) => {
            let failures = prior_failures.saturating_add(1);
            if failures >= ESCALATE_AFTER {
                error!(url, error = %e, consecutive_failures = failures, "dashboard poll keeps failing");
            } else {
                warn!(url, error = %e, consecutive_failures = failures, "dashboard poll failed, will retry");
            }
        }
    }
}

/// Owner of a running poll loop. Dropping it stops polling.
#[derive(Debug)]
pub struct PollerHandle {
    alive: Arc<Mutex<bool>>,
    task: Option<JoinHandle<()>>,
    state: Arc<RwLock<PollerState>>,
}

impl PollerHandle {
    /// Stops polling. Idempotent; once it returns no fetch result is applied.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            *self.alive.lock() = false;
            task.abort();
            info!("snapshot poller stopped");
        }
    }

    /// Whether the loop is still active.
    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Clone of the current state.
    pub fn state(&self) -> PollerState {
        self.state.read().clone()
    }

    /// Current tri-state.
    pub fn status(&self) -> PollStatus {
        self.state.read().status()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
