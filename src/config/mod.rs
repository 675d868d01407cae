//! # Module: Live View Configuration
//!
//! ## Responsibility
//! Parse and validate the TOML configuration that replaces every demo
//! constant of the live view: tick and poll intervals, channel bounds and
//! biases, alert catalog and emission probability, buffer capacities.
//! ```text
//! cargo run --bin driftguard-tui -- --config driftguard.toml
//! ```
//!
//! ## Guarantees
//! - Deterministic: same TOML input always produces the same `DriftGuardConfig`
//! - Complete defaults: an empty file is a valid configuration
//! - Validated: semantic constraints are checked before a config is accepted
//! - Schema-exportable: JSON Schema output enables IDE autocomplete
//!
//! ## NOT Responsible For
//! - Building feed state from config (that belongs to `feed`)
//! - Running the poller (that belongs to `poller`)

pub mod loader;
pub mod validation;

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::api::Severity;

// ── Default value functions ──────────────────────────────────────────────

/// Default simulation tick: 2 seconds.
fn default_tick_interval_ms() -> u64 {
    2000
}

/// Default sparkline / trend history length.
fn default_history_len() -> usize {
    20
}

/// Prediction counter value shown before the first tick.
fn default_initial_predictions() -> u64 {
    1247
}

/// Exclusive upper bound of the per-tick prediction increment.
fn default_prediction_increment_max() -> u64 {
    20
}

/// Default alert feed capacity.
fn default_alert_capacity() -> usize {
    10
}

/// Default per-tick alert emission probability.
fn default_alert_probability() -> f64 {
    0.05
}

/// Default synthetic alert messages.
fn default_alert_messages() -> Vec<String> {
    [
        "High latency detected",
        "Drift detected in \"age\"",
        "Data schema mismatch warning",
        "Model endpoint restarting",
    ]
    .iter()
    .map(|m| m.to_string())
    .collect()
}

/// Default severities drawn for synthetic alerts.
fn default_alert_severities() -> Vec<Severity> {
    vec![Severity::Critical, Severity::Warning, Severity::Info]
}

/// Default backend base URL.
fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

/// Default snapshot poll interval: 10 seconds.
fn default_poll_interval_ms() -> u64 {
    10_000
}

/// Default TCP connect timeout.
fn default_connect_timeout_ms() -> u64 {
    3000
}

/// Default per-request timeout.
fn default_request_timeout_ms() -> u64 {
    10_000
}

/// Default backoff multiplier.
fn default_backoff_multiplier() -> f64 {
    2.0
}

/// Default backoff ceiling: 60 seconds.
fn default_backoff_max_ms() -> u64 {
    60_000
}

/// Default enabled state: true.
fn default_true() -> bool {
    true
}

/// Channels shown on the live page.
fn default_channels() -> Vec<ChannelConfig> {
    vec![
        ChannelConfig {
            name: "accuracy".into(),
            initial: 87.5,
            min: 70.0,
            max: 100.0,
            bias: -0.2,
            drift_bias: Some(-0.6),
            step: 1.0,
        },
        ChannelConfig {
            name: "latency_ms".into(),
            initial: 45.0,
            min: 20.0,
            max: 120.0,
            bias: 0.0,
            drift_bias: Some(0.4),
            step: 2.5,
        },
        ChannelConfig {
            name: "throughput".into(),
            initial: 1250.0,
            min: 500.0,
            max: 2000.0,
            bias: 0.0,
            drift_bias: None,
            step: 60.0,
        },
        ChannelConfig {
            name: "prediction_rate".into(),
            initial: 75.0,
            min: 0.0,
            max: 100.0,
            bias: 0.0,
            drift_bias: None,
            step: 12.0,
        },
    ]
}

// ── Top-level config ─────────────────────────────────────────────────────

/// Root configuration for the live view.
///
/// Every section and field has a default, so an empty TOML document is valid.
///
/// # Example
///
/// ```toml
/// [feed]
/// tick_interval_ms = 1000
/// seed = 42
///
/// [poller]
/// base_url = "http://localhost:5000"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DriftGuardConfig {
    /// Metric simulation settings.
    #[serde(default)]
    pub feed: FeedConfig,
    /// Alert feed settings.
    #[serde(default)]
    pub alerts: AlertConfig,
    /// Remote snapshot poller settings.
    #[serde(default)]
    pub poller: PollerConfig,
    /// Logging settings.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ── Feed ─────────────────────────────────────────────────────────────────

/// Metric simulation settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FeedConfig {
    /// Milliseconds between simulation ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Samples retained per channel history.
    #[serde(default = "default_history_len")]
    pub history_len: usize,
    /// RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Prefill channel histories before the first render.
    #[serde(default = "default_true")]
    pub warm_up: bool,
    /// Prediction counter value before the first tick.
    #[serde(default = "default_initial_predictions")]
    pub initial_predictions: u64,
    /// Exclusive upper bound of the per-tick prediction increment.
    #[serde(default = "default_prediction_increment_max")]
    pub prediction_increment_max: u64,
    /// Tick at which drift bias kicks in. `None` never switches automatically.
    pub drift_onset_tick: Option<u64>,
    /// Simulated channels.
    #[serde(default = "default_channels")]
    pub channels: Vec<ChannelConfig>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            history_len: default_history_len(),
            seed: None,
            warm_up: true,
            initial_predictions: default_initial_predictions(),
            prediction_increment_max: default_prediction_increment_max(),
            drift_onset_tick: None,
            channels: default_channels(),
        }
    }
}

impl FeedConfig {
    /// Tick interval as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// One simulated channel.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ChannelConfig {
    /// Channel name, unique within the feed.
    pub name: String,
    /// Starting value.
    pub initial: f64,
    /// Lower clamp bound.
    pub min: f64,
    /// Upper clamp bound.
    pub max: f64,
    /// Mean step before drift onset.
    #[serde(default)]
    pub bias: f64,
    /// Mean step after drift onset. `None` keeps `bias`.
    pub drift_bias: Option<f64>,
    /// Half-width of the uniform step draw.
    pub step: f64,
}

// ── Alerts ───────────────────────────────────────────────────────────────

/// Alert feed settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AlertConfig {
    /// Maximum alerts retained.
    #[serde(default = "default_alert_capacity")]
    pub capacity: usize,
    /// Probability of emitting one alert per tick.
    #[serde(default = "default_alert_probability")]
    pub probability: f64,
    /// Message catalog for synthetic alerts.
    #[serde(default = "default_alert_messages")]
    pub messages: Vec<String>,
    /// Severities drawn for synthetic alerts.
    #[serde(default = "default_alert_severities")]
    pub severities: Vec<Severity>,
    /// Start with the three demo alerts.
    #[serde(default = "default_true")]
    pub seed_fixtures: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            capacity: default_alert_capacity(),
            probability: default_alert_probability(),
            messages: default_alert_messages(),
            severities: default_alert_severities(),
            seed_fixtures: true,
        }
    }
}

// ── Poller ───────────────────────────────────────────────────────────────

/// Remote snapshot poller settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PollerConfig {
    /// Whether the poller runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Backend base URL; endpoints are resolved below it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Milliseconds between polls.
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
    /// TCP connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Capped exponential backoff after failures.
    #[serde(default)]
    pub backoff: BackoffConfig,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_base_url(),
            interval_ms: default_poll_interval_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            backoff: BackoffConfig::default(),
        }
    }
}

impl PollerConfig {
    /// Poll interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Connect timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Capped exponential backoff. Disabled by default: every failure is
/// retried at the regular interval.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BackoffConfig {
    /// Whether backoff applies.
    #[serde(default)]
    pub enabled: bool,
    /// Growth factor per consecutive failure.
    #[serde(default = "default_backoff_multiplier")]
    pub multiplier: f64,
    /// Ceiling for the delay in milliseconds.
    #[serde(default = "default_backoff_max_ms")]
    pub max_interval_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            multiplier: default_backoff_multiplier(),
            max_interval_ms: default_backoff_max_ms(),
        }
    }
}

// ── Observability ────────────────────────────────────────────────────────

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ObservabilityConfig {
    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable, colorized log output.
    #[default]
    Pretty,
    /// Structured JSON log output for machine consumption.
    Json,
}

impl LogFormat {
    /// Value understood by `LOG_FORMAT`.
    pub fn as_env_value(&self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }

    /// Parses a `LOG_FORMAT` value: `"json"` is JSON, anything else is pretty.
    pub fn from_env_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }

    /// Format requested through `LOG_FORMAT`, if the variable is set.
    pub fn from_env() -> Option<Self> {
        std::env::var("LOG_FORMAT")
            .ok()
            .map(|v| Self::from_env_value(&v))
    }
}

/// Export the JSON Schema for `DriftGuardConfig`.
///
/// # Errors
///
/// Returns `serde_json::Error` if schema serialization fails.
///
/// # Panics
///
/// This function never panics.
pub fn export_schema() -> Result<String, serde_json::Error> {
    let schema = schemars::schema_for!(DriftGuardConfig);
    serde_json::to_string_pretty(&schema)
}
