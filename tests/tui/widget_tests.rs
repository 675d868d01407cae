//! Full-frame rendering tests on a test backend.
//!
//! Each test draws the whole dashboard and checks the text that lands in the
//! buffer, covering every poll state, the details panel and the size guard.

use chrono::Utc;
use driftguard_live::api::{
    DashboardSnapshot, DistributionStats, DriftFeature, DriftStatus, DriftSummary,
    FeatureDetails, FetchError, Recommendation, RecommendedAction,
};
use driftguard_live::config::{AlertConfig, FeedConfig};
use driftguard_live::poller::{PollerState, UNAVAILABLE_MESSAGE};
use driftguard_live::tui::app::{App, DetailsPanel, MIN_COLS, MIN_ROWS};
use driftguard_live::tui::ui;
use driftguard_live::LiveFeed;
use ratatui::backend::TestBackend;
use ratatui::Terminal;

fn app(poll_enabled: bool) -> App {
    let feed = LiveFeed::new(
        FeedConfig {
            seed: Some(3),
            ..FeedConfig::default()
        },
        AlertConfig::default(),
    );
    App::new(feed.snapshot(), poll_enabled)
}

fn snapshot(health: f64) -> DashboardSnapshot {
    DashboardSnapshot {
        health_score: health,
        metrics: Vec::new(),
        alerts: Vec::new(),
        drift_summary: DriftSummary {
            score: 0.4,
            drifting_count: 2,
            total_count: 5,
            recommendation: Some(Recommendation {
                action: RecommendedAction::RetrainUrgent,
                estimated_time: Some("2 hours".to_string()),
            }),
        },
        top_features: vec![DriftFeature {
            name: "income".to_string(),
            psi: 0.31,
            ks: None,
            kl: None,
            status: DriftStatus::Critical,
            drift_score: Some(31.0),
        }],
    }
}

fn render(app: &App, width: u16, height: u16) -> String {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).expect("test: terminal");
    terminal
        .draw(|f| ui::draw(f, app))
        .expect("test: draw succeeds");
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

#[test]
fn test_renders_at_minimum_size() {
    let text = render(&app(true), 100, 32);
    assert!(text.contains("DriftGuard Live Monitoring"));
    assert!(text.contains("PAUSED"));
    assert!(text.contains("ALERTS (3)"));
    assert!(text.contains("PREDICTIONS"));
}

#[test]
fn test_renders_at_large_size() {
    let text = render(&app(true), 200, 60);
    assert!(text.contains("PERFORMANCE TRENDS"));
    assert!(text.contains("accuracy"));
    assert!(text.contains("1,247"));
}

#[test]
fn test_too_small_shows_guard() {
    let text = render(&app(true), 80, 24);
    assert!(text.contains("Terminal too small"));
    assert!(text.contains("80x24"));
    assert!(!text.contains("ALERTS"));
}

#[test]
fn test_degenerate_sizes_do_not_panic() {
    let app = app(true);
    for (w, h) in [(1, 1), (100, 1), (1, 40), (MIN_COLS - 1, MIN_ROWS)] {
        render(&app, w, h);
    }
}

#[test]
fn test_loading_state() {
    let text = render(&app(true), 120, 40);
    assert!(text.contains("Loading dashboard data"));
    assert!(text.contains("backend: loading"));
}

#[test]
fn test_disabled_polling_state() {
    let text = render(&app(false), 120, 40);
    assert!(text.contains("Backend polling disabled"));
    assert!(text.contains("backend: off"));
}

#[test]
fn test_error_state_shows_unavailable_message() {
    let mut app = app(true);
    let mut state = PollerState::default();
    state.apply(Err(FetchError::Status(500)), Utc::now());
    app.refresh(app.feed.clone(), state, Utc::now());

    let text = render(&app, 160, 40);
    assert!(text.contains(UNAVAILABLE_MESSAGE));
    assert!(text.contains("backend: unreachable"));
}

#[test]
fn test_ready_state_shows_health_and_drift() {
    let mut app = app(true);
    let mut state = PollerState::default();
    state.apply(Ok(snapshot(64.0)), Utc::now());
    app.refresh(app.feed.clone(), state, Utc::now());

    let text = render(&app, 160, 40);
    assert!(text.contains("64%"));
    assert!(text.contains("Drift Detected"));
    assert!(text.contains("2/5 features drifting"));
    assert!(text.contains("Retrain urgently"));
    assert!(text.contains("income"));
    assert!(text.contains("backend: ok"));
}

#[test]
fn test_stale_state_keeps_snapshot_visible() {
    let mut app = app(true);
    let mut state = PollerState::default();
    state.apply(Ok(snapshot(92.0)), Utc::now());
    state.apply(Err(FetchError::Status(503)), Utc::now());
    app.refresh(app.feed.clone(), state, Utc::now());

    let text = render(&app, 160, 40);
    assert!(text.contains("Healthy"));
    assert!(text.contains("Stale"));
    assert!(text.contains("backend: stale"));
}

#[test]
fn test_feature_details_panel_renders_table() {
    let mut app = app(true);
    let stats = |mean: f64| DistributionStats {
        mean,
        median: mean,
        std: 5.0,
        min: 0.0,
        max: 100.0,
    };
    app.details = DetailsPanel::Loaded {
        name: "income".to_string(),
        details: FeatureDetails {
            psi: 0.31,
            status: "critical".to_string(),
            baseline_stats: stats(50.0),
            production_stats: stats(60.0),
            chart_data: Vec::new(),
        },
    };

    let text = render(&app, 160, 48);
    assert!(text.contains("FEATURE: income"));
    assert!(text.contains("Training"));
    assert!(text.contains("+20.0%"));
    assert!(text.contains("n/a"), "zero training min has no percent change");
}

#[test]
fn test_feature_details_failure_renders() {
    let mut app = app(true);
    app.details = DetailsPanel::Failed {
        name: "age".to_string(),
        error: "backend returned HTTP 404".to_string(),
    };
    let text = render(&app, 160, 48);
    assert!(text.contains("Could not load feature details"));
    assert!(text.contains("HTTP 404"));
}

#[test]
fn test_help_overlay_renders_on_top() {
    let mut app = app(true);
    app.show_help = true;
    let text = render(&app, 120, 40);
    assert!(text.contains("Help"));
    assert!(text.contains("Press any key to close"));
}

#[test]
fn test_long_alert_message_is_truncated() {
    let feed = LiveFeed::new(
        FeedConfig {
            seed: Some(1),
            ..FeedConfig::default()
        },
        AlertConfig {
            probability: 1.0,
            messages: vec!["x".repeat(400)],
            seed_fixtures: false,
            ..AlertConfig::default()
        },
    );
    feed.tick_now(Utc::now());
    let app = App::new(feed.snapshot(), false);
    let text = render(&app, 100, 32);
    assert!(text.contains('\u{2026}'));
}
