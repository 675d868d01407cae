//! # Module: Metric Simulator
//!
//! ## Responsibility
//! Advance the simulated metric channels by one bounded random-walk step per
//! tick, and count simulated predictions.
//!
//! ## Guarantees
//! - Deterministic: the same state and the same seeded RNG produce the same
//!   next state
//! - Bounded: every channel value is clamped to `[min, max]` before it is
//!   stored or pushed into history
//! - Pure: `step` never mutates its input
//!
//! ## NOT Responsible For
//! - Timing (that belongs to `scheduler`)
//! - Alert synthesis (that belongs to `alerts`)

use rand::Rng;
use serde::Serialize;

use super::ring::RingBuffer;
use crate::config::{ChannelConfig, FeedConfig};

/// One simulated scalar channel with its recent history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricChannel {
    /// Channel name.
    pub name: String,
    /// Current value, always within `[min, max]`.
    pub value: f64,
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
    /// Mean step before drift onset.
    pub bias: f64,
    /// Mean step after drift onset; `None` keeps `bias`.
    pub drift_bias: Option<f64>,
    /// Half-width of the uniform step draw.
    pub step: f64,
    /// Recent values, oldest first.
    pub history: RingBuffer<f64>,
}

/// Replaces a non-finite number with `fallback`.
fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

impl MetricChannel {
    /// Builds a channel at its initial value with a one-sample history.
    ///
    /// The configuration is not trusted: inverted bounds are swapped, a
    /// non-finite bound falls back to the initial value (or 0.0), non-finite
    /// biases become 0.0 and a negative or non-finite step disables noise.
    pub fn from_config(config: &ChannelConfig, history_len: usize) -> Self {
        let anchor = finite_or(config.initial, 0.0);
        let (lo, hi) = (finite_or(config.min, anchor), finite_or(config.max, anchor));
        let (min, max) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        let value = anchor.clamp(min, max);

        let step = if config.step.is_finite() && config.step > 0.0 {
            config.step
        } else {
            0.0
        };

        let mut history = RingBuffer::new(history_len);
        history.push(value);
        Self {
            name: config.name.clone(),
            value,
            min,
            max,
            bias: finite_or(config.bias, 0.0),
            drift_bias: config.drift_bias.map(|b| finite_or(b, 0.0)),
            step,
            history,
        }
    }

    /// Mean step in effect for the given drift state.
    pub fn effective_bias(&self, drift_active: bool) -> f64 {
        if drift_active {
            self.drift_bias.unwrap_or(self.bias)
        } else {
            self.bias
        }
    }

    /// Position of `value` within the range, 0.0 at `min` and 1.0 at `max`.
    pub fn ratio(&self) -> f64 {
        // Halved operands keep extreme finite bounds from overflowing.
        let span = self.max / 2.0 - self.min / 2.0;
        if span <= 0.0 {
            return 1.0;
        }
        ((self.value / 2.0 - self.min / 2.0) / span).clamp(0.0, 1.0)
    }

    fn advance<R: Rng + ?Sized>(&mut self, drift_active: bool, rng: &mut R) {
        // A unit draw scaled by `step` stays finite for any finite step.
        let noise = if self.step > 0.0 {
            self.step * rng.gen_range(-1.0_f64..=1.0)
        } else {
            0.0
        };
        let next = (self.value + self.effective_bias(drift_active) + noise).clamp(self.min, self.max);
        self.value = next;
        self.history.push(next);
    }
}

/// Complete simulated metric state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricState {
    /// Number of steps applied since creation.
    pub tick: u64,
    /// Whether the drift bias is in effect.
    pub drift_active: bool,
    /// Simulated channels in configuration order.
    pub channels: Vec<MetricChannel>,
    /// Running total of simulated predictions.
    pub predictions_total: u64,
}

impl MetricState {
    /// Initial state from the feed configuration.
    pub fn from_config(config: &FeedConfig) -> Self {
        Self {
            tick: 0,
            drift_active: false,
            channels: config
                .channels
                .iter()
                .map(|c| MetricChannel::from_config(c, config.history_len))
                .collect(),
            predictions_total: config.initial_predictions,
        }
    }

    /// Looks up a channel by name.
    pub fn channel(&self, name: &str) -> Option<&MetricChannel> {
        self.channels.iter().find(|c| c.name == name)
    }

    /// Switches the drift bias on regardless of the onset tick.
    pub fn force_drift(&mut self) {
        self.drift_active = true;
    }
}

/// Stateless step function parameterised by the feed configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricSimulator {
    drift_onset_tick: Option<u64>,
    prediction_increment_max: u64,
}

impl MetricSimulator {
    /// Creates a simulator.
    ///
    /// `prediction_increment_max` is the exclusive bound of the per-tick
    /// prediction increment; 0 is treated as 1.
    pub fn new(drift_onset_tick: Option<u64>, prediction_increment_max: u64) -> Self {
        Self {
            drift_onset_tick,
            prediction_increment_max: prediction_increment_max.max(1),
        }
    }

    /// Creates a simulator from the feed configuration.
    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(config.drift_onset_tick, config.prediction_increment_max)
    }

    /// Computes the next state.
    ///
    /// For each channel `next = clamp(value + bias' + U(-step, step), min, max)`
    /// where `bias'` is the drift bias once drift is active. Drift becomes
    /// active when the new tick reaches the configured onset and stays active.
    ///
    /// # Panics
    /// This function never panics.
    pub fn step<R: Rng + ?Sized>(&self, state: &MetricState, rng: &mut R) -> MetricState {
        let mut next = state.clone();
        next.tick = state.tick.saturating_add(1);
        next.drift_active =
            state.drift_active || self.drift_onset_tick.is_some_and(|onset| next.tick >= onset);

        for channel in &mut next.channels {
            channel.advance(next.drift_active, rng);
        }

        let increment = rng.gen_range(0..self.prediction_increment_max);
        next.predictions_total = state.predictions_total.saturating_add(increment);
        next
    }

    /// Prefills channel histories with `samples` walk steps.
    ///
    /// Neither the tick counter nor the prediction total moves, so a warmed-up
    /// state still reads as "no ticks yet".
    pub fn warm_up<R: Rng + ?Sized>(
        &self,
        state: &MetricState,
        samples: usize,
        rng: &mut R,
    ) -> MetricState {
        let mut next = state.clone();
        for _ in 0..samples {
            for channel in &mut next.channels {
                channel.advance(next.drift_active, rng);
            }
        }
        next
    }
}
