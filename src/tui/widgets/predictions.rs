//! # Widget: Prediction Counter
//!
//! ## Responsibility
//! Renders the running prediction total and a sparkline of the
//! `prediction_rate` channel using Ratatui's built-in Sparkline widget.
//!
//! ## Guarantees
//! - Handles a missing channel or empty history (shows an empty chart)
//! - Never panics on any data range

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Sparkline as RatatuiSparkline};
use ratatui::Frame;

use crate::feed::simulator::MetricChannel;
use crate::tui::app::App;

/// Channel whose history backs the sparkline.
pub const RATE_CHANNEL: &str = "prediction_rate";

/// Scales a channel history into sparkline bars relative to its range.
///
/// Values are mapped onto `0..=100` so channels with different units share
/// one vertical scale.
pub fn sparkline_data(channel: &MetricChannel) -> Vec<u64> {
    let span = channel.max - channel.min;
    channel
        .history
        .values()
        .map(|v| {
            if span <= 0.0 {
                100
            } else {
                (((v - channel.min) / span).clamp(0.0, 1.0) * 100.0).round() as u64
            }
        })
        .collect()
}

/// Formats an integer with thousands separators.
pub fn with_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Renders the prediction counter widget.
///
/// # Arguments
/// * `f` - Ratatui frame to render into.
/// * `area` - Rectangular area allocated for this widget.
/// * `app` - Application state containing the feed snapshot.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(Span::styled(
            " PREDICTIONS ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(inner);

    let rate = app.feed.metrics.channel(RATE_CHANNEL);
    let header = vec![
        Line::from(vec![
            Span::styled(
                with_thousands(app.feed.metrics.predictions_total),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" total", Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(Span::styled(
            match rate {
                Some(ch) => format!("{:.0}/s now", ch.value),
                None => "rate unavailable".to_string(),
            },
            Style::default().fg(Color::DarkGray),
        )),
    ];
    f.render_widget(Paragraph::new(header), chunks[0]);

    let data = rate.map(sparkline_data).unwrap_or_default();
    let sparkline = RatatuiSparkline::default()
        .data(&data)
        .max(100)
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(sparkline, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChannelConfig;

    fn rate_channel() -> MetricChannel {
        MetricChannel::from_config(
            &ChannelConfig {
                name: RATE_CHANNEL.into(),
                initial: 50.0,
                min: 0.0,
                max: 100.0,
                bias: 0.0,
                drift_bias: None,
                step: 10.0,
            },
            5,
        )
    }

    #[test]
    fn test_sparkline_data_scales_to_range() {
        let mut ch = rate_channel();
        ch.history.push(0.0);
        ch.history.push(100.0);
        assert_eq!(sparkline_data(&ch), vec![50, 0, 100]);
    }

    #[test]
    fn test_sparkline_data_degenerate_range() {
        let mut ch = rate_channel();
        ch.min = 5.0;
        ch.max = 5.0;
        assert_eq!(sparkline_data(&ch), vec![100]);
    }

    #[test]
    fn test_with_thousands() {
        assert_eq!(with_thousands(0), "0");
        assert_eq!(with_thousands(999), "999");
        assert_eq!(with_thousands(1247), "1,247");
        assert_eq!(with_thousands(1_234_567), "1,234,567");
    }
}
