//! # Module: Backend API Contract
//!
//! ## Responsibility
//! Typed mirror of the JSON returned by the DriftGuard backend
//! (`/api/dashboard-data`, `/api/feature-details/{name}`) plus the client
//! that fetches it.
//!
//! ## Guarantees
//! - Decoding tolerates the shapes the backend actually emits: numeric or
//!   string alert ids, `type` as an alias of `severity`, preformatted metric
//!   values, capitalised drift statuses, absent `ks`/`kl`
//! - Every drift number is carried verbatim; nothing here computes drift
//!
//! ## NOT Responsible For
//! - Polling cadence or stale-data policy (that belongs to `poller`)

pub mod client;

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use client::{DriftGuardClient, FetchError};

/// Health score below which the dashboard reports drift.
pub const HEALTHY_THRESHOLD: f64 = 70.0;

/// PSI at or above which a feature is critical.
pub const PSI_CRITICAL: f64 = 0.2;

/// PSI at or above which a feature is a warning.
pub const PSI_WARNING: f64 = 0.1;

// ── Alerts ───────────────────────────────────────────────────────────────

/// Alert severity, shared by backend alerts and synthetic feed alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Needs immediate attention.
    #[serde(alias = "Critical", alias = "CRITICAL")]
    Critical,
    /// Degradation worth watching.
    #[serde(alias = "Warning", alias = "WARNING")]
    Warning,
    /// Informational.
    #[serde(alias = "Info", alias = "INFO")]
    Info,
}

impl Severity {
    /// All severities, most severe first.
    pub const ALL: [Severity; 3] = [Severity::Critical, Severity::Warning, Severity::Info];

    /// Upper-case display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Alert id as sent by the backend: a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteAlertId {
    /// Numeric id.
    Number(u64),
    /// String id.
    Text(String),
}

impl fmt::Display for RemoteAlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Alert raised by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Backend-assigned id.
    pub id: RemoteAlertId,
    /// Severity; the backend sends it as `type`.
    #[serde(alias = "type")]
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Relative label such as "Just now".
    #[serde(default)]
    pub timestamp: String,
}

// ── Metrics ──────────────────────────────────────────────────────────────

/// A value the backend may send as a number or as preformatted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayValue {
    /// Raw number.
    Number(f64),
    /// Preformatted text such as `"1,234"` or `"87.5%"`.
    Text(String),
}

impl DisplayValue {
    /// Numeric value, parsing text with thousands separators and `%` removed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s
                .trim()
                .trim_end_matches('%')
                .replace(',', "")
                .parse()
                .ok(),
        }
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Headline metric card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Card label.
    pub label: String,
    /// Current value.
    pub value: DisplayValue,
    /// Percentage change; negative is a drop.
    #[serde(default)]
    pub change: f64,
    /// Optional status hint (`positive`, `negative`, `warning`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// ── Drift ────────────────────────────────────────────────────────────────

/// Per-feature drift classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftStatus {
    /// PSI at or above [`PSI_CRITICAL`].
    #[serde(alias = "Critical", alias = "CRITICAL")]
    Critical,
    /// PSI at or above [`PSI_WARNING`].
    #[serde(alias = "Warning", alias = "WARNING")]
    Warning,
    /// Stable.
    #[serde(alias = "Good", alias = "GOOD")]
    Good,
}

impl DriftStatus {
    /// Classifies a PSI value with the backend thresholds.
    pub fn from_psi(psi: f64) -> Self {
        if psi >= PSI_CRITICAL {
            Self::Critical
        } else if psi >= PSI_WARNING {
            Self::Warning
        } else {
            Self::Good
        }
    }

    /// Parses a status string case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Some(Self::Critical),
            "warning" => Some(Self::Warning),
            "good" => Some(Self::Good),
            _ => None,
        }
    }

    /// Upper-case display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Warning => "WARNING",
            Self::Good => "GOOD",
        }
    }
}

/// A drifting feature in the top-N list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftFeature {
    /// Feature name.
    pub name: String,
    /// Population Stability Index.
    pub psi: f64,
    /// Kolmogorov–Smirnov statistic, when provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ks: Option<f64>,
    /// KL divergence, when provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kl: Option<f64>,
    /// Classification.
    pub status: DriftStatus,
    /// Display score (`psi * 100`), when provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drift_score: Option<f64>,
}

/// Suggested next step for the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecommendedAction {
    /// `RETRAIN_URGENT`
    RetrainUrgent,
    /// `MONITOR`
    Monitor,
    /// Any other action string, kept verbatim.
    Other(String),
}

impl From<String> for RecommendedAction {
    fn from(s: String) -> Self {
        match s.as_str() {
            "RETRAIN_URGENT" => Self::RetrainUrgent,
            "MONITOR" => Self::Monitor,
            _ => Self::Other(s),
        }
    }
}

impl From<RecommendedAction> for String {
    fn from(action: RecommendedAction) -> Self {
        match action {
            RecommendedAction::RetrainUrgent => "RETRAIN_URGENT".to_string(),
            RecommendedAction::Monitor => "MONITOR".to_string(),
            RecommendedAction::Other(s) => s,
        }
    }
}

impl RecommendedAction {
    /// Human-readable label.
    pub fn label(&self) -> &str {
        match self {
            Self::RetrainUrgent => "Retrain urgently",
            Self::Monitor => "Keep monitoring",
            Self::Other(s) => s,
        }
    }
}

/// Retraining recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// What to do.
    pub action: RecommendedAction,
    /// Estimated retraining time, e.g. "2 hours".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
}

/// Aggregate drift figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftSummary {
    /// Fraction of drifting features (0.0 - 1.0).
    pub score: f64,
    /// Features not in `good` status.
    pub drifting_count: u32,
    /// Features analysed.
    pub total_count: u32,
    /// Suggested action, when the backend sends one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
}

// ── Snapshot ─────────────────────────────────────────────────────────────

/// Authoritative dashboard state returned by `/api/dashboard-data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Overall model health (0 - 100).
    pub health_score: f64,
    /// Headline metric cards.
    #[serde(default)]
    pub metrics: Vec<Metric>,
    /// Active backend alerts.
    #[serde(default)]
    pub alerts: Vec<Alert>,
    /// Aggregate drift figures.
    pub drift_summary: DriftSummary,
    /// Most drifting features, highest PSI first.
    #[serde(default)]
    pub top_features: Vec<DriftFeature>,
}

impl DashboardSnapshot {
    /// "Drift Detected" below [`HEALTHY_THRESHOLD`], "Healthy" otherwise.
    pub fn health_label(&self) -> &'static str {
        if self.health_score < HEALTHY_THRESHOLD {
            "Drift Detected"
        } else {
            "Healthy"
        }
    }

    /// Health score as a ratio clamped to [0.0, 1.0].
    pub fn health_ratio(&self) -> f64 {
        (self.health_score / 100.0).clamp(0.0, 1.0)
    }

    /// The feature with the highest PSI.
    pub fn top_feature(&self) -> Option<&DriftFeature> {
        self.top_features
            .iter()
            .max_by(|a, b| a.psi.total_cmp(&b.psi))
    }
}

// ── Feature details ──────────────────────────────────────────────────────

/// Summary statistics for one distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionStats {
    /// Mean.
    pub mean: f64,
    /// Median.
    pub median: f64,
    /// Standard deviation.
    pub std: f64,
    /// Minimum.
    pub min: f64,
    /// Maximum.
    pub max: f64,
}

/// One histogram bin comparing training and production.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    /// Bin label.
    pub bin: DisplayValue,
    /// Training share or count.
    pub training: f64,
    /// Production share or count.
    pub production: f64,
}

/// Response of `/api/feature-details/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDetails {
    /// Population Stability Index.
    pub psi: f64,
    /// Status string as sent by the backend.
    pub status: String,
    /// Training distribution.
    pub baseline_stats: DistributionStats,
    /// Production distribution.
    pub production_stats: DistributionStats,
    /// Distribution comparison.
    #[serde(default)]
    pub chart_data: Vec<HistogramBin>,
}

/// One row of the training-vs-production comparison table.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    /// Statistic name.
    pub metric: &'static str,
    /// Training value.
    pub training: f64,
    /// Production value.
    pub production: f64,
    /// `(production - training) / training * 100`; `None` when training is 0.
    pub change_pct: Option<f64>,
    /// Whether a change in this statistic signals drift.
    pub flagged: bool,
}

impl FeatureDetails {
    /// Parsed status, falling back to the PSI thresholds for unknown strings.
    pub fn drift_status(&self) -> DriftStatus {
        DriftStatus::parse(&self.status).unwrap_or_else(|| DriftStatus::from_psi(self.psi))
    }

    /// Mean, median, std, min and max side by side.
    pub fn stat_rows(&self) -> Vec<StatRow> {
        let b = &self.baseline_stats;
        let p = &self.production_stats;
        [
            ("Mean", b.mean, p.mean, true),
            ("Median", b.median, p.median, true),
            ("Std Dev", b.std, p.std, true),
            ("Min", b.min, p.min, false),
            ("Max", b.max, p.max, true),
        ]
        .into_iter()
        .map(|(metric, training, production, flagged)| StatRow {
            metric,
            training,
            production,
            change_pct: percent_change(training, production),
            flagged,
        })
        .collect()
    }
}

fn percent_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 || !from.is_finite() || !to.is_finite() {
        None
    } else {
        Some((to - from) / from * 100.0)
    }
}
