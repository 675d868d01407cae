//! Configuration validation engine.
//!
//! ## Responsibility
//! Validate semantic constraints on a parsed [`DriftGuardConfig`] that cannot
//! be expressed through the type system alone (range checks, cross-field
//! invariants).
//!
//! ## Guarantees
//! - Validation collects *all* errors before returning (no short-circuit)
//! - Error messages include the field path and the invalid value
//!
//! ## NOT Responsible For
//! - Parsing TOML (that belongs to `loader`)
//! - File I/O (that belongs to `loader`)

use std::collections::HashSet;

use super::DriftGuardConfig;

/// Errors arising from configuration parsing, validation, or I/O.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parsing failed.
    #[error("Parse error in {file}: {source}")]
    Parse {
        /// Path of the file that failed to parse.
        file: String,
        /// Underlying TOML deserialization error.
        #[source]
        source: toml::de::Error,
    },

    /// One or more semantic validation rules failed.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A specific field has an out-of-range or contradictory value.
    #[error("Field '{field}' has invalid value {value}: {reason}")]
    InvalidField {
        /// Dot-separated field path (e.g., "poller.interval_ms").
        field: String,
        /// String representation of the invalid value.
        value: String,
        /// Human-readable explanation of the constraint.
        reason: String,
    },

    /// File I/O error.
    #[error("IO error reading {file}: {source}")]
    Io {
        /// Path of the file that could not be read.
        file: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidField {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Validate all semantic constraints on a [`DriftGuardConfig`].
///
/// Collects every violation before returning so the caller sees the full
/// scope of issues at once.
///
/// # Returns
///
/// - `Ok(())` if all constraints pass.
/// - `Err(Vec<ConfigError>)` with every violation found.
///
/// # Panics
///
/// This function never panics.
pub fn validate(config: &DriftGuardConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // ── Feed ─────────────────────────────────────────────────────────
    let feed = &config.feed;
    if feed.tick_interval_ms == 0 {
        errors.push(invalid("feed.tick_interval_ms", 0, "must be at least 1ms"));
    }
    if feed.history_len == 0 {
        errors.push(invalid("feed.history_len", 0, "must be at least 1"));
    }
    if feed.prediction_increment_max == 0 {
        errors.push(invalid(
            "feed.prediction_increment_max",
            0,
            "must be at least 1",
        ));
    }
    if feed.channels.is_empty() {
        errors.push(invalid("feed.channels", "[]", "at least one channel is required"));
    }

    let mut seen = HashSet::new();
    for (i, ch) in feed.channels.iter().enumerate() {
        let path = format!("feed.channels[{i}]");
        if ch.name.trim().is_empty() {
            errors.push(invalid(format!("{path}.name"), "", "must not be empty"));
        } else if !seen.insert(ch.name.as_str()) {
            errors.push(invalid(format!("{path}.name"), &ch.name, "duplicate channel name"));
        }
        if !(ch.min.is_finite() && ch.max.is_finite()) || ch.min > ch.max {
            errors.push(invalid(
                format!("{path}.min"),
                ch.min,
                "must be finite and \u{2264} max",
            ));
        } else if !(ch.min..=ch.max).contains(&ch.initial) {
            errors.push(invalid(
                format!("{path}.initial"),
                ch.initial,
                "must lie within [min, max]",
            ));
        }
        if !ch.step.is_finite() || ch.step < 0.0 {
            errors.push(invalid(
                format!("{path}.step"),
                ch.step,
                "must be a non-negative number",
            ));
        }
        let biases = std::iter::once(ch.bias).chain(ch.drift_bias);
        if biases.into_iter().any(|b| !b.is_finite()) {
            errors.push(invalid(format!("{path}.bias"), ch.bias, "must be finite"));
        }
    }

    // ── Alerts ───────────────────────────────────────────────────────
    let alerts = &config.alerts;
    if alerts.capacity == 0 {
        errors.push(invalid("alerts.capacity", 0, "must be at least 1"));
    }
    if !(0.0..=1.0).contains(&alerts.probability) {
        errors.push(invalid(
            "alerts.probability",
            alerts.probability,
            "must be between 0.0 and 1.0",
        ));
    }
    if alerts.messages.is_empty() {
        errors.push(invalid("alerts.messages", "[]", "catalog must not be empty"));
    }
    if alerts.severities.is_empty() {
        errors.push(invalid("alerts.severities", "[]", "must not be empty"));
    }

    // ── Poller ───────────────────────────────────────────────────────
    let poller = &config.poller;
    if poller.interval_ms == 0 {
        errors.push(invalid("poller.interval_ms", 0, "must be at least 1ms"));
    }
    if poller.request_timeout_ms == 0 {
        errors.push(invalid("poller.request_timeout_ms", 0, "must be at least 1ms"));
    }
    if !(poller.base_url.starts_with("http://") || poller.base_url.starts_with("https://")) {
        errors.push(invalid(
            "poller.base_url",
            &poller.base_url,
            "must be an http:// or https:// URL",
        ));
    }
    if poller.backoff.enabled {
        if !poller.backoff.multiplier.is_finite() || poller.backoff.multiplier < 1.0 {
            errors.push(invalid(
                "poller.backoff.multiplier",
                poller.backoff.multiplier,
                "must be \u{2265} 1.0",
            ));
        }
        if poller.backoff.max_interval_ms < poller.interval_ms {
            errors.push(invalid(
                "poller.backoff.max_interval_ms",
                poller.backoff.max_interval_ms,
                "must be \u{2265} poller.interval_ms",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
