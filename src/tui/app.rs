//! # Module: TUI App State
//!
//! ## Responsibility
//! Owns everything the dashboard renders: the latest feed snapshot, the
//! latest poller state, alert selection, the feature-details panel and UI
//! toggles. Widgets read from `App` only; they never touch the feed or the
//! poller directly.
//!
//! ## Guarantees
//! - The alert selection always points at an existing alert (or 0 when empty)
//! - `refresh()` and every selection method never panic
//! - The status line is bounded to one message

use chrono::{DateTime, Utc};

use crate::api::{DriftFeature, FeatureDetails};
use crate::feed::alerts::AlertEvent;
use crate::feed::FeedSnapshot;
use crate::poller::{PollStatus, PollerState};

/// Minimum terminal width for the dashboard to render.
pub const MIN_COLS: u16 = 100;

/// Minimum terminal height for the dashboard to render.
pub const MIN_ROWS: u16 = 32;

/// Model name shown in the top bar.
pub const MODEL_NAME: &str = "Credit Scoring Model v2.3";

/// State of the feature drill-down panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DetailsPanel {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// Request in flight for the named feature.
    Loading(String),
    /// Details for the named feature.
    Loaded {
        /// Feature name.
        name: String,
        /// Backend response.
        details: FeatureDetails,
    },
    /// Request for the named feature failed.
    Failed {
        /// Feature name.
        name: String,
        /// Human-readable error.
        error: String,
    },
}

/// Primary application state for the live dashboard.
#[derive(Debug)]
pub struct App {
    /// Whether the application should exit.
    pub should_quit: bool,
    /// Whether the help overlay is visible.
    pub show_help: bool,
    /// Index into `feed.alerts` of the highlighted alert.
    pub selected_alert: usize,
    /// Latest simulated state.
    pub feed: FeedSnapshot,
    /// Latest remote snapshot state.
    pub poller: PollerState,
    /// Whether remote polling is enabled at all.
    pub poll_enabled: bool,
    /// Feature drill-down panel.
    pub details: DetailsPanel,
    /// One-line transient message for the footer.
    pub status: Option<String>,
    /// Wall-clock time of the last refresh; relative labels are computed from it.
    pub now: DateTime<Utc>,
}

impl App {
    /// Creates the app from the first feed snapshot.
    pub fn new(feed: FeedSnapshot, poll_enabled: bool) -> Self {
        Self {
            should_quit: false,
            show_help: false,
            selected_alert: 0,
            now: feed.last_update,
            feed,
            poller: PollerState::default(),
            poll_enabled,
            details: DetailsPanel::Idle,
            status: None,
        }
    }

    /// Replaces the rendered state with fresh clones and re-clamps the
    /// selection.
    ///
    /// The selection follows the selected alert by id when it is still in
    /// the feed, so a newly prepended alert does not move the highlight.
    pub fn refresh(&mut self, feed: FeedSnapshot, poller: PollerState, now: DateTime<Utc>) {
        let selected_id = self.selected().map(|a| a.id);
        self.feed = feed;
        self.poller = poller;
        self.now = now;
        self.selected_alert = selected_id
            .and_then(|id| self.feed.alerts.iter().position(|a| a.id == id))
            .unwrap_or(self.selected_alert);
        self.clamp_selection();
    }

    /// Currently highlighted alert.
    pub fn selected(&self) -> Option<&AlertEvent> {
        self.feed.alerts.get(self.selected_alert)
    }

    /// Moves the highlight one alert up (towards newer).
    pub fn select_prev(&mut self) {
        self.selected_alert = self.selected_alert.saturating_sub(1);
    }

    /// Moves the highlight one alert down (towards older).
    pub fn select_next(&mut self) {
        if self.selected_alert + 1 < self.feed.alerts.len() {
            self.selected_alert += 1;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.feed.alerts.len();
        if len == 0 {
            self.selected_alert = 0;
        } else if self.selected_alert >= len {
            self.selected_alert = len - 1;
        }
    }

    /// Remote poll status, or `None` when polling is disabled.
    pub fn poll_status(&self) -> Option<PollStatus> {
        self.poll_enabled.then(|| self.poller.status())
    }

    /// Most drifting feature in the latest remote snapshot.
    pub fn top_feature(&self) -> Option<&DriftFeature> {
        self.poller.snapshot.as_ref().and_then(|s| s.top_feature())
    }

    /// Sets the footer message.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// Whether the simulated feed is ticking.
    pub fn is_playing(&self) -> bool {
        self.feed.playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{DashboardSnapshot, DriftStatus, DriftSummary, FetchError};
    use crate::config::{AlertConfig, FeedConfig};
    use crate::feed::LiveFeed;

    fn feed_snapshot() -> FeedSnapshot {
        let feed = LiveFeed::new(
            FeedConfig {
                seed: Some(1),
                ..FeedConfig::default()
            },
            AlertConfig::default(),
        );
        feed.snapshot()
    }

    fn remote_with_features(features: Vec<DriftFeature>) -> DashboardSnapshot {
        DashboardSnapshot {
            health_score: 64.0,
            metrics: Vec::new(),
            alerts: Vec::new(),
            drift_summary: DriftSummary {
                score: 0.4,
                drifting_count: 2,
                total_count: 5,
                recommendation: None,
            },
            top_features: features,
        }
    }

    fn feature(name: &str, psi: f64) -> DriftFeature {
        DriftFeature {
            name: name.into(),
            psi,
            ks: None,
            kl: None,
            status: DriftStatus::from_psi(psi),
            drift_score: None,
        }
    }

    #[test]
    fn test_app_new_initializes_with_defaults() {
        let app = App::new(feed_snapshot(), true);
        assert!(!app.should_quit);
        assert!(!app.show_help);
        assert_eq!(app.selected_alert, 0);
        assert_eq!(app.details, DetailsPanel::Idle);
        assert_eq!(app.poll_status(), Some(PollStatus::Loading));
    }

    #[test]
    fn test_poll_status_none_when_disabled() {
        let app = App::new(feed_snapshot(), false);
        assert_eq!(app.poll_status(), None);
    }

    #[test]
    fn test_selection_bounded_by_alert_count() {
        let mut app = App::new(feed_snapshot(), false);
        for _ in 0..10 {
            app.select_next();
        }
        assert_eq!(app.selected_alert, 2);
        for _ in 0..10 {
            app.select_prev();
        }
        assert_eq!(app.selected_alert, 0);
    }

    #[test]
    fn test_refresh_clamps_selection_after_removal() {
        let mut app = App::new(feed_snapshot(), false);
        app.selected_alert = 2;
        let mut fewer = app.feed.clone();
        fewer.alerts.truncate(1);
        app.refresh(fewer, PollerState::default(), Utc::now());
        assert_eq!(app.selected_alert, 0);
    }

    #[test]
    fn test_refresh_keeps_selection_on_same_alert() {
        let mut app = App::new(feed_snapshot(), false);
        app.selected_alert = 1;
        let id = app.selected().map(|a| a.id);

        let mut newer = app.feed.clone();
        let mut prepended = newer.alerts[0].clone();
        prepended.id = crate::feed::alerts::AlertId(99);
        newer.alerts.insert(0, prepended);
        app.refresh(newer, PollerState::default(), Utc::now());

        assert_eq!(app.selected_alert, 2);
        assert_eq!(app.selected().map(|a| a.id), id);
    }

    #[test]
    fn test_top_feature_from_remote_snapshot() {
        let mut app = App::new(feed_snapshot(), true);
        assert!(app.top_feature().is_none());
        let mut poller = PollerState::default();
        poller.apply(
            Ok(remote_with_features(vec![
                feature("age", 0.12),
                feature("income", 0.45),
            ])),
            Utc::now(),
        );
        app.refresh(app.feed.clone(), poller, Utc::now());
        assert_eq!(app.top_feature().map(|f| f.name.as_str()), Some("income"));
        assert_eq!(app.poll_status(), Some(PollStatus::Ready));
    }

    #[test]
    fn test_poll_error_state_visible() {
        let mut app = App::new(feed_snapshot(), true);
        let mut poller = PollerState::default();
        poller.apply(Err(FetchError::Status(500)), Utc::now());
        app.refresh(app.feed.clone(), poller, Utc::now());
        assert_eq!(app.poll_status(), Some(PollStatus::Error));
    }
}
