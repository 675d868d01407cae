//! # driftguard-live
//!
//! Live monitoring view for the DriftGuard model-monitoring product.
//!
//! ## Architecture
//!
//! Two independent, cancelable loops feed one view:
//! ```text
//! TickScheduler ─► MetricSimulator ─► RingBuffer history ─┐
//!               └► AlertFeed (maybe_emit) ────────────────┼─► view snapshot
//! SnapshotPoller ─► GET /api/dashboard-data ──────────────┘
//! ```
//!
//! Every drift number shown here is either simulated client-side or taken
//! verbatim from the backend snapshot; nothing is computed statistically.

// ── Lint policy ───────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(missing_docs)]

use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub mod api;
pub mod cli;
pub mod config;
pub mod feed;
pub mod poller;

#[cfg(feature = "tui")]
pub mod tui;

// Re-exports for convenience
pub use api::{DashboardSnapshot, DriftGuardClient, FeatureDetails, FetchError};
pub use config::{DriftGuardConfig, LogFormat};
pub use feed::{FeedError, FeedSnapshot, LiveFeed};
pub use poller::{PollStatus, PollerHandle, SnapshotPoller};

/// Initialise the global tracing subscriber from the environment.
///
/// Reads the `LOG_FORMAT` environment variable to choose output format:
/// - `"json"` — structured JSON output for log aggregators
/// - anything else (including unset) — human-readable pretty output
///
/// Filter level is controlled by `RUST_LOG` (e.g. `RUST_LOG=info`).
///
/// # Errors
///
/// Returns [`DriftGuardError::Other`] if the global subscriber has already
/// been set (e.g. by a previous call or a test harness).
///
/// # Panics
///
/// This function never panics.
///
/// # Example
///
/// ```no_run
/// # use driftguard_live::{init_tracing, DriftGuardError};
/// # fn example() -> Result<(), DriftGuardError> {
/// init_tracing()?;
/// # Ok(()) }
/// ```
pub fn init_tracing() -> Result<(), DriftGuardError> {
    init_tracing_with(LogFormat::from_env().unwrap_or_default())
}

/// Initialise the global tracing subscriber with an explicit format.
///
/// # Errors
///
/// Returns [`DriftGuardError::Other`] if the global subscriber has already
/// been set.
pub fn init_tracing_with(format: LogFormat) -> Result<(), DriftGuardError> {
    let result = match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .with_current_span(true)
            .with_span_list(true)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init(),
    };

    result.map_err(|e| DriftGuardError::Other(format!("tracing init failed: {e}")))
}

/// Top-level errors.
///
/// Each concern keeps its own error type; this enum is what binaries and
/// callers that mix concerns propagate with `?`.
#[derive(Error, Debug)]
pub enum DriftGuardError {
    /// Configuration could not be loaded or failed validation.
    #[error(transparent)]
    Config(#[from] config::validation::ConfigError),

    /// A scheduler or poller could not be started.
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// A backend request failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Catch-all for errors that do not fit a specific variant.
    #[error("{0}")]
    Other(String),
}
