//! Live feed integration tests.
//!
//! Tests in this module verify, through the public `LiveFeed` API:
//! - Channel values never leave their configured bounds over long runs
//! - The alert feed never exceeds capacity and stays newest-first
//! - Drift switches on at the configured onset tick (or when forced)
//! - A TOML config drives the whole feed end to end
//! - Start, restart and stop under paused tokio time

use std::time::Duration;

use chrono::{TimeZone, Utc};
use driftguard_live::api::Severity;
use driftguard_live::config::loader::load_from_str;
use driftguard_live::config::{AlertConfig, ChannelConfig, FeedConfig};
use driftguard_live::LiveFeed;

fn feed_config(seed: u64) -> FeedConfig {
    FeedConfig {
        seed: Some(seed),
        tick_interval_ms: 100,
        ..FeedConfig::default()
    }
}

fn noisy_alerts(probability: f64, capacity: usize) -> AlertConfig {
    AlertConfig {
        probability,
        capacity,
        seed_fixtures: false,
        ..AlertConfig::default()
    }
}

// ── Simulation bounds ─────────────────────────────────────────────────

#[test]
fn test_channels_stay_within_bounds_over_long_run() {
    let mut config = feed_config(11);
    config.drift_onset_tick = Some(50);
    let feed = LiveFeed::new(config, AlertConfig::default());
    let now = Utc::now();

    for _ in 0..2_000 {
        feed.tick_now(now);
        for ch in &feed.snapshot().metrics.channels {
            assert!(
                ch.value >= ch.min && ch.value <= ch.max,
                "{} out of bounds: {} not in [{}, {}]",
                ch.name,
                ch.value,
                ch.min,
                ch.max
            );
        }
    }
}

#[test]
fn test_history_is_bounded_by_history_len() {
    let mut config = feed_config(3);
    config.history_len = 8;
    let feed = LiveFeed::new(config, AlertConfig::default());
    for _ in 0..50 {
        feed.tick_now(Utc::now());
    }
    for ch in &feed.snapshot().metrics.channels {
        assert_eq!(ch.history.len(), 8);
        assert_eq!(ch.history.latest().copied(), Some(ch.value));
    }
}

#[test]
fn test_predictions_total_never_decreases() {
    let feed = LiveFeed::new(feed_config(9), AlertConfig::default());
    let mut last = feed.snapshot().metrics.predictions_total;
    for _ in 0..200 {
        feed.tick_now(Utc::now());
        let total = feed.snapshot().metrics.predictions_total;
        assert!(total >= last);
        assert!(total - last < 20, "increment must stay below the configured max");
        last = total;
    }
}

// ── Drift ─────────────────────────────────────────────────────────────

#[test]
fn test_drift_activates_at_onset_tick() {
    let mut config = feed_config(21);
    config.drift_onset_tick = Some(5);
    let feed = LiveFeed::new(config, AlertConfig::default());

    for tick in 1..=4 {
        feed.tick_now(Utc::now());
        assert!(!feed.snapshot().metrics.drift_active, "drift early at tick {tick}");
    }
    feed.tick_now(Utc::now());
    assert!(feed.snapshot().metrics.drift_active);

    for _ in 0..10 {
        feed.tick_now(Utc::now());
    }
    assert!(feed.snapshot().metrics.drift_active, "drift must stay active");
}

#[test]
fn test_drift_bias_pushes_value_to_bound() {
    let config = FeedConfig {
        seed: Some(1),
        warm_up: false,
        channels: vec![ChannelConfig {
            name: "accuracy".into(),
            initial: 90.0,
            min: 70.0,
            max: 100.0,
            bias: 0.0,
            drift_bias: Some(-5.0),
            step: 0.0,
        }],
        ..FeedConfig::default()
    };
    let feed = LiveFeed::new(config, AlertConfig::default());
    feed.force_drift();
    for _ in 0..10 {
        feed.tick_now(Utc::now());
    }
    let snap = feed.snapshot();
    let accuracy = snap.metrics.channel("accuracy").expect("test: channel exists");
    assert_eq!(accuracy.value, 70.0);
}

#[test]
fn test_default_accuracy_trends_downward() {
    for seed in 0..5 {
        let feed = LiveFeed::new(feed_config(seed), noisy_alerts(0.0, 10));
        let start = feed.snapshot().metrics.channel("accuracy").map(|c| c.value);
        for _ in 0..300 {
            feed.tick_now(Utc::now());
        }
        let snap = feed.snapshot();
        assert!(!snap.metrics.drift_active, "downward trend must not need drift");
        let accuracy = snap.metrics.channel("accuracy").expect("test: channel exists");
        assert!(
            accuracy.value < 76.0,
            "seed {seed}: accuracy {} did not decay from {start:?}",
            accuracy.value
        );
    }
}

#[test]
fn test_no_onset_never_drifts() {
    let feed = LiveFeed::new(feed_config(8), AlertConfig::default());
    for _ in 0..500 {
        feed.tick_now(Utc::now());
    }
    assert!(!feed.snapshot().metrics.drift_active);
}

// ── Untrusted configuration ───────────────────────────────────────────

#[test]
fn test_extreme_step_from_valid_config_does_not_panic() {
    let toml = r#"
        [feed]
        seed = 3

        [[feed.channels]]
        name = "accuracy"
        initial = 90.0
        min = 70.0
        max = 100.0
        step = 1e308
    "#;
    let config = load_from_str(toml, "inline").expect("test: config validates");
    let feed = LiveFeed::from_config(&config);
    for _ in 0..100 {
        feed.tick_now(Utc::now());
    }
    let snap = feed.snapshot();
    let accuracy = snap.metrics.channel("accuracy").expect("test: channel exists");
    assert!((70.0..=100.0).contains(&accuracy.value));
}

#[test]
fn test_unvalidated_inverted_bounds_are_normalised() {
    let config = FeedConfig {
        seed: Some(2),
        channels: vec![ChannelConfig {
            name: "latency_ms".into(),
            initial: 3.0,
            min: 5.0,
            max: 1.0,
            bias: 0.0,
            drift_bias: None,
            step: 1.0,
        }],
        ..FeedConfig::default()
    };
    let feed = LiveFeed::new(config, AlertConfig::default());
    for _ in 0..50 {
        feed.tick_now(Utc::now());
    }
    let snap = feed.snapshot();
    let latency = snap.metrics.channel("latency_ms").expect("test: channel exists");
    assert_eq!((latency.min, latency.max), (1.0, 5.0));
    assert!((1.0..=5.0).contains(&latency.value));
}

#[test]
fn test_unvalidated_nan_bound_does_not_panic() {
    let config = FeedConfig {
        seed: Some(2),
        channels: vec![ChannelConfig {
            name: "throughput".into(),
            initial: 1_000.0,
            min: f64::NAN,
            max: 2_000.0,
            bias: 0.0,
            drift_bias: None,
            step: 50.0,
        }],
        ..FeedConfig::default()
    };
    let feed = LiveFeed::new(config, AlertConfig::default());
    feed.tick_now(Utc::now());
    let snap = feed.snapshot();
    let throughput = snap.metrics.channel("throughput").expect("test: channel exists");
    assert!(throughput.value.is_finite());
    assert!((1_000.0..=2_000.0).contains(&throughput.value));
}

// ── Alerts ────────────────────────────────────────────────────────────

#[test]
fn test_certain_emission_fills_to_capacity_newest_first() {
    let feed = LiveFeed::new(feed_config(5), noisy_alerts(1.0, 4));
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).single().expect("test: time");

    for i in 0..10 {
        let outcome = feed.tick_now(start + chrono::Duration::seconds(i));
        assert!(outcome.alert.is_some(), "probability 1.0 must emit every tick");
    }

    let snap = feed.snapshot();
    assert_eq!(snap.alerts.len(), 4);
    assert_eq!(snap.alert_counts.total(), 4);
    for pair in snap.alerts.windows(2) {
        assert!(pair[0].id > pair[1].id, "alerts must be newest first");
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}

#[test]
fn test_zero_probability_never_emits() {
    let feed = LiveFeed::new(feed_config(5), noisy_alerts(0.0, 10));
    for _ in 0..500 {
        assert!(feed.tick_now(Utc::now()).alert.is_none());
    }
    assert!(feed.snapshot().alerts.is_empty());
}

#[test]
fn test_emitted_alerts_come_from_catalog() {
    let alerts = AlertConfig {
        probability: 1.0,
        capacity: 50,
        messages: vec!["only message".into()],
        severities: vec![Severity::Critical],
        seed_fixtures: false,
    };
    let feed = LiveFeed::new(feed_config(2), alerts);
    for _ in 0..20 {
        feed.tick_now(Utc::now());
    }
    let snap = feed.snapshot();
    assert!(snap.alerts.iter().all(|a| a.message == "only message"));
    assert_eq!(snap.alert_counts.critical, 20);
    assert_eq!(snap.alert_counts.warning + snap.alert_counts.info, 0);
}

#[test]
fn test_dismiss_keeps_other_alerts_in_order() {
    let feed = LiveFeed::new(feed_config(4), noisy_alerts(1.0, 10));
    for _ in 0..5 {
        feed.tick_now(Utc::now());
    }
    let before = feed.snapshot().alerts;
    let target = before[2].id;

    assert!(feed.dismiss(target));
    let after = feed.snapshot().alerts;
    let expected: Vec<_> = before.iter().map(|a| a.id).filter(|id| *id != target).collect();
    let actual: Vec<_> = after.iter().map(|a| a.id).collect();
    assert_eq!(actual, expected);
}

// ── Config driven ─────────────────────────────────────────────────────

#[test]
fn test_toml_config_drives_feed() {
    let toml = r#"
        [feed]
        seed = 42
        history_len = 5
        initial_predictions = 10
        prediction_increment_max = 1

        [[feed.channels]]
        name = "latency_ms"
        initial = 50.0
        min = 20.0
        max = 120.0
        drift_bias = 1.0
        step = 0.0

        [alerts]
        probability = 0.0
        seed_fixtures = false
    "#;
    let config = load_from_str(toml, "inline").expect("test: config parses");
    let feed = LiveFeed::from_config(&config);

    let snap = feed.snapshot();
    assert_eq!(snap.metrics.channels.len(), 1);
    assert_eq!(snap.metrics.predictions_total, 10);
    assert!(snap.alerts.is_empty());

    for _ in 0..3 {
        feed.tick_now(Utc::now());
    }
    let snap = feed.snapshot();
    // prediction_increment_max = 1 means the increment is always 0
    assert_eq!(snap.metrics.predictions_total, 10);
    let latency = snap.metrics.channel("latency_ms").expect("test: channel");
    assert_eq!(latency.value, 50.0);
    assert_eq!(latency.history.len(), 5);
}

// ── Scheduling ────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_started_feed_ticks_on_interval() {
    let mut feed = LiveFeed::new(feed_config(1), AlertConfig::default());
    feed.start().expect("test: start inside runtime");
    assert!(feed.is_playing());
    assert!(feed.snapshot().playing);

    tokio::time::sleep(Duration::from_millis(550)).await;
    assert_eq!(feed.snapshot().metrics.tick, 5);

    feed.stop();
    assert!(!feed.snapshot().playing);
    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(feed.snapshot().metrics.tick, 5);
}

#[tokio::test(start_paused = true)]
async fn test_restart_replaces_running_timer() {
    let mut feed = LiveFeed::new(feed_config(1), AlertConfig::default());
    feed.start().expect("test: start");
    feed.start().expect("test: restart");

    tokio::time::sleep(Duration::from_millis(350)).await;
    // Two live timers would have produced 6 ticks.
    assert_eq!(feed.snapshot().metrics.tick, 3);
    feed.stop();
}

#[tokio::test(start_paused = true)]
async fn test_reset_while_playing_keeps_playing() {
    let mut feed = LiveFeed::new(feed_config(6), AlertConfig::default());
    feed.start().expect("test: start");
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(feed.snapshot().metrics.tick >= 2);

    feed.reset();
    let snap = feed.snapshot();
    assert!(snap.playing);
    assert_eq!(snap.metrics.tick, 0);
    assert_eq!(snap.alerts.len(), 3);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(feed.snapshot().metrics.tick, 1);
    feed.stop();
}
