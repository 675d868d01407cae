//! # Module: Alert Feed
//!
//! ## Responsibility
//! Hold the newest-first list of synthetic alert events shown on the live
//! view, emit new events probabilistically and dismiss them by id.
//!
//! ## Guarantees
//! - `len() <= capacity()` after every operation
//! - The newest event is always at index 0
//! - Ids are unique for the lifetime of the feed (monotonic counter)
//! - Events are immutable once created
//! - Dismissing an absent id is a no-op

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::api::Severity;
use crate::config::AlertConfig;

/// Unique alert id within one feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AlertId(pub u64);

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single alert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertEvent {
    /// Feed-unique id.
    pub id: AlertId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Human-readable message.
    pub message: String,
    /// Severity.
    pub severity: Severity,
}

impl AlertEvent {
    /// Relative age label, e.g. "Just now" or "5m ago".
    pub fn label(&self, now: DateTime<Utc>) -> String {
        relative_label(self.created_at, now)
    }
}

/// Formats the age of `then` relative to `now`.
///
/// Under ten seconds (or in the future) reads "Just now"; then seconds,
/// minutes, hours and days.
pub fn relative_label(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    match secs {
        s if s < 10 => "Just now".to_string(),
        s if s < 60 => format!("{s}s ago"),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s => format!("{}d ago", s / 86_400),
    }
}

/// Message templates, severities and emission probability for synthetic alerts.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertCatalog {
    /// Per-tick emission probability in `[0.0, 1.0]`.
    pub probability: f64,
    /// Message templates.
    pub messages: Vec<String>,
    /// Severities to draw from.
    pub severities: Vec<Severity>,
}

impl AlertCatalog {
    /// Builds the catalog from configuration.
    pub fn from_config(config: &AlertConfig) -> Self {
        Self {
            probability: config.probability,
            messages: config.messages.clone(),
            severities: config.severities.clone(),
        }
    }
}

impl Default for AlertCatalog {
    fn default() -> Self {
        Self::from_config(&AlertConfig::default())
    }
}

/// Alert counts per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    /// Critical alerts.
    pub critical: usize,
    /// Warning alerts.
    pub warning: usize,
    /// Info alerts.
    pub info: usize,
}

impl SeverityCounts {
    /// Sum of all severities.
    pub fn total(&self) -> usize {
        self.critical + self.warning + self.info
    }
}

/// Newest-first, capacity-bounded alert list.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertFeed {
    events: VecDeque<AlertEvent>,
    capacity: usize,
    next_id: u64,
}

impl AlertFeed {
    /// Creates an empty feed. A capacity of zero is normalised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    /// Creates a feed pre-populated with the three demo alerts, aged
    /// 8, 5 and 2 minutes relative to `now`.
    pub fn with_fixtures(capacity: usize, now: DateTime<Utc>) -> Self {
        let mut feed = Self::new(capacity);
        feed.push(
            "Accuracy dropped below 88%",
            Severity::Critical,
            now - ChronoDuration::minutes(8),
        );
        feed.push(
            "Prediction rate increased 15%",
            Severity::Info,
            now - ChronoDuration::minutes(5),
        );
        feed.push(
            "PSI threshold exceeded for \"income\"",
            Severity::Warning,
            now - ChronoDuration::minutes(2),
        );
        feed
    }

    /// Builds the feed described by `config`.
    pub fn from_config(config: &AlertConfig, now: DateTime<Utc>) -> Self {
        if config.seed_fixtures {
            Self::with_fixtures(config.capacity, now)
        } else {
            Self::new(config.capacity)
        }
    }

    /// Prepends an event and truncates to capacity. Returns its id.
    pub fn push(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
        created_at: DateTime<Utc>,
    ) -> AlertId {
        let id = AlertId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.events.push_front(AlertEvent {
            id,
            created_at,
            message: message.into(),
            severity,
        });
        self.events.truncate(self.capacity);
        id
    }

    /// With probability `catalog.probability`, synthesises one alert from the
    /// catalog and prepends it.
    ///
    /// Returns the new id, or `None` when nothing was emitted.
    ///
    /// # Panics
    /// This function never panics.
    pub fn maybe_emit<R: Rng + ?Sized>(
        &mut self,
        catalog: &AlertCatalog,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Option<AlertId> {
        if rng.gen::<f64>() >= catalog.probability {
            return None;
        }
        let message = catalog.messages.choose(rng)?.clone();
        let severity = catalog
            .severities
            .choose(rng)
            .copied()
            .unwrap_or(Severity::Info);
        let id = self.push(message, severity, now);
        debug!(alert_id = id.0, severity = %severity, "synthetic alert emitted");
        Some(id)
    }

    /// Removes the event with `id`. Returns whether anything was removed.
    pub fn dismiss(&mut self, id: AlertId) -> bool {
        match self.events.iter().position(|e| e.id == id) {
            Some(index) => {
                self.events.remove(index);
                true
            }
            None => false,
        }
    }

    /// Events, newest first.
    pub fn events(&self) -> impl ExactSizeIterator<Item = &AlertEvent> + '_ {
        self.events.iter()
    }

    /// Event at `index` (0 is newest).
    pub fn get(&self, index: usize) -> Option<&AlertEvent> {
        self.events.get(index)
    }

    /// Number of events held.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the feed is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Maximum number of events retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Counts per severity.
    pub fn counts(&self) -> SeverityCounts {
        self.events
            .iter()
            .fold(SeverityCounts::default(), |mut acc, e| {
                match e.severity {
                    Severity::Critical => acc.critical += 1,
                    Severity::Warning => acc.warning += 1,
                    Severity::Info => acc.info += 1,
                }
                acc
            })
    }
}
