//! App state tests driven by a real feed and poller state.

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use driftguard_live::api::{
    DashboardSnapshot, DriftFeature, DriftStatus, DriftSummary, FetchError,
};
use driftguard_live::config::{AlertConfig, FeedConfig};
use driftguard_live::poller::{PollStatus, PollerState};
use driftguard_live::tui::app::{App, DetailsPanel};
use driftguard_live::tui::events::{apply_event, translate_key, Action, InputEvent};
use driftguard_live::LiveFeed;

fn feed(probability: f64) -> LiveFeed {
    LiveFeed::new(
        FeedConfig {
            seed: Some(17),
            ..FeedConfig::default()
        },
        AlertConfig {
            probability,
            ..AlertConfig::default()
        },
    )
}

fn snapshot_with_features(features: &[(&str, f64)]) -> DashboardSnapshot {
    DashboardSnapshot {
        health_score: 64.0,
        metrics: Vec::new(),
        alerts: Vec::new(),
        drift_summary: DriftSummary {
            score: 0.4,
            drifting_count: features.len() as u32,
            total_count: 5,
            recommendation: None,
        },
        top_features: features
            .iter()
            .map(|(name, psi)| DriftFeature {
                name: name.to_string(),
                psi: *psi,
                ks: None,
                kl: None,
                status: DriftStatus::from_psi(*psi),
                drift_score: None,
            })
            .collect(),
    }
}

fn ready_state(snapshot: DashboardSnapshot) -> PollerState {
    let mut state = PollerState::default();
    state.apply(Ok(snapshot), Utc::now());
    state
}

fn press(app: &mut App, code: KeyCode) -> Option<Action> {
    apply_event(app, translate_key(KeyEvent::new(code, KeyModifiers::NONE)))
}

#[test]
fn test_new_app_shows_fixture_alerts_newest_first() {
    let feed = feed(0.0);
    let app = App::new(feed.snapshot(), true);
    assert_eq!(app.feed.alerts.len(), 3);
    assert_eq!(app.selected_alert, 0);
    assert_eq!(app.poll_status(), Some(PollStatus::Loading));
    let newest = app.selected().expect("test: selection");
    assert!(newest.message.contains("PSI threshold"));
}

#[test]
fn test_selection_follows_alert_when_new_alerts_arrive() {
    let feed = feed(1.0);
    let mut app = App::new(feed.snapshot(), true);

    press(&mut app, KeyCode::Down);
    let selected_id = app.selected().expect("test: selection").id;

    feed.tick_now(Utc::now());
    app.refresh(feed.snapshot(), PollerState::default(), Utc::now());

    assert_eq!(app.selected().map(|a| a.id), Some(selected_id));
    assert_eq!(app.selected_alert, 2);
}

#[test]
fn test_dismiss_flow_removes_selected_alert() {
    let feed = feed(0.0);
    let mut app = App::new(feed.snapshot(), false);
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Down);
    assert_eq!(app.selected_alert, 2, "selection must stop at the last alert");

    let action = press(&mut app, KeyCode::Char('d'));
    let Some(Action::Dismiss(id)) = action else {
        panic!("expected dismiss action, got {action:?}");
    };
    assert!(feed.dismiss(id));

    app.refresh(feed.snapshot(), PollerState::default(), Utc::now());
    assert_eq!(app.feed.alerts.len(), 2);
    assert_eq!(app.selected_alert, 1, "selection is clamped to the shorter feed");
}

#[test]
fn test_dismiss_on_empty_feed_is_noop() {
    let feed = LiveFeed::new(
        FeedConfig::default(),
        AlertConfig {
            seed_fixtures: false,
            probability: 0.0,
            ..AlertConfig::default()
        },
    );
    let mut app = App::new(feed.snapshot(), false);
    assert!(app.selected().is_none());
    assert_eq!(press(&mut app, KeyCode::Char('d')), None);
}

#[test]
fn test_play_and_reset_keys_produce_actions() {
    let mut app = App::new(feed(0.0).snapshot(), true);
    assert_eq!(press(&mut app, KeyCode::Char('p')), Some(Action::TogglePlay));
    assert_eq!(press(&mut app, KeyCode::Char(' ')), Some(Action::TogglePlay));
    assert_eq!(press(&mut app, KeyCode::Char('r')), Some(Action::Reset));
}

#[test]
fn test_x_key_forces_drift_on_feed() {
    let feed = feed(0.0);
    let mut app = App::new(feed.snapshot(), false);
    assert!(!app.feed.metrics.drift_active);

    assert_eq!(press(&mut app, KeyCode::Char('x')), Some(Action::ForceDrift));
    feed.force_drift();
    feed.tick_now(Utc::now());
    app.refresh(feed.snapshot(), PollerState::default(), Utc::now());
    assert!(app.feed.metrics.drift_active);
}

#[test]
fn test_feature_key_requests_top_feature() {
    let mut app = App::new(feed(0.0).snapshot(), true);
    let state = ready_state(snapshot_with_features(&[("age", 0.14), ("income", 0.31)]));
    app.refresh(app.feed.clone(), state, Utc::now());

    let action = press(&mut app, KeyCode::Char('f'));
    assert_eq!(action, Some(Action::LoadFeature("income".to_string())));
    assert_eq!(app.details, DetailsPanel::Loading("income".to_string()));
}

#[test]
fn test_feature_key_without_snapshot_sets_status() {
    let mut app = App::new(feed(0.0).snapshot(), true);
    assert_eq!(press(&mut app, KeyCode::Char('f')), None);
    assert_eq!(app.details, DetailsPanel::Idle);
    assert!(app.status.is_some());
}

#[test]
fn test_help_overlay_swallows_keys() {
    let mut app = App::new(feed(0.0).snapshot(), true);
    press(&mut app, KeyCode::Char('h'));
    assert!(app.show_help);

    assert_eq!(press(&mut app, KeyCode::Char('p')), None);
    assert!(!app.show_help);
    assert_eq!(press(&mut app, KeyCode::Char('p')), Some(Action::TogglePlay));
}

#[test]
fn test_quit_from_help_overlay() {
    let mut app = App::new(feed(0.0).snapshot(), true);
    press(&mut app, KeyCode::Char('?'));
    press(&mut app, KeyCode::Esc);
    assert!(app.should_quit);
}

#[test]
fn test_ctrl_c_quits() {
    let mut app = App::new(feed(0.0).snapshot(), true);
    let event = translate_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert_eq!(event, InputEvent::Quit);
    apply_event(&mut app, event);
    assert!(app.should_quit);
}

#[test]
fn test_poll_status_tracks_poller_state() {
    let mut app = App::new(feed(0.0).snapshot(), true);
    let mut state = PollerState::default();
    state.apply(Err(FetchError::Status(500)), Utc::now());
    app.refresh(app.feed.clone(), state.clone(), Utc::now());
    assert_eq!(app.poll_status(), Some(PollStatus::Error));

    state.apply(Ok(snapshot_with_features(&[])), Utc::now());
    state.apply(Err(FetchError::Status(502)), Utc::now());
    app.refresh(app.feed.clone(), state, Utc::now());
    assert_eq!(app.poll_status(), Some(PollStatus::Ready));
    assert!(app.poller.is_stale());
}

#[test]
fn test_disabled_polling_has_no_status() {
    let app = App::new(feed(0.0).snapshot(), false);
    assert_eq!(app.poll_status(), None);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_reflects_playing_feed() {
    let mut live = feed(0.0);
    let mut app = App::new(live.snapshot(), false);
    assert!(!app.is_playing());

    live.start().expect("test: start");
    tokio::time::sleep(std::time::Duration::from_millis(4_500)).await;
    app.refresh(live.snapshot(), PollerState::default(), Utc::now());

    assert!(app.is_playing());
    assert_eq!(app.feed.metrics.tick, 2);
    live.stop();
}
