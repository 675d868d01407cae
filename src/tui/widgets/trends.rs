//! # Widget: Channel Trends
//!
//! ## Responsibility
//! Renders one row per simulated channel: name, current value, position in
//! its range, and a block-character trend line of its recent history.
//!
//! ## Guarantees
//! - Trend glyphs are scaled to the channel's configured bounds
//! - Handles any number of channels; extra rows are clipped
//! - Never panics on degenerate ranges

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::gauges::fill_bar;
use crate::feed::simulator::MetricChannel;
use crate::tui::app::App;

const GLYPHS: [char; 8] = [
    '\u{2581}', '\u{2582}', '\u{2583}', '\u{2584}', '\u{2585}', '\u{2586}', '\u{2587}', '\u{2588}',
];

/// Width of the range-position bar.
const RANGE_BAR_WIDTH: usize = 10;

/// Renders `values` as a one-line trend of block glyphs scaled to `[min, max]`.
///
/// At most `width` glyphs are produced, taken from the newest end.
pub fn trend_line<'a>(
    values: impl DoubleEndedIterator<Item = &'a f64> + ExactSizeIterator,
    min: f64,
    max: f64,
    width: usize,
) -> String {
    let span = max - min;
    let skip = values.len().saturating_sub(width);
    values
        .skip(skip)
        .map(|v| {
            let ratio = if span <= 0.0 {
                1.0
            } else {
                ((v - min) / span).clamp(0.0, 1.0)
            };
            let index = (ratio * (GLYPHS.len() - 1) as f64).round() as usize;
            GLYPHS[index.min(GLYPHS.len() - 1)]
        })
        .collect()
}

/// Arrow showing the direction of the last step.
pub fn direction_arrow(channel: &MetricChannel) -> &'static str {
    let mut recent = channel.history.values().rev();
    match (recent.next(), recent.next()) {
        (Some(last), Some(prev)) if last > prev => "\u{2191}",
        (Some(last), Some(prev)) if last < prev => "\u{2193}",
        _ => "\u{2192}",
    }
}

/// Renders the channel trends widget.
///
/// # Arguments
/// * `f` - Ratatui frame to render into.
/// * `area` - Rectangular area allocated for this widget.
/// * `app` - Application state containing the feed snapshot.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let title = if app.feed.metrics.drift_active {
        Span::styled(
            " PERFORMANCE TRENDS \u{2022} DRIFT ACTIVE ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::raw(" PERFORMANCE TRENDS ")
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    // name(16) value(10) arrow(2) bar(12) space
    let trend_width = (inner.width as usize).saturating_sub(42);

    let lines: Vec<Line> = app
        .feed
        .metrics
        .channels
        .iter()
        .map(|ch| {
            Line::from(vec![
                Span::styled(format!("{:<16.16}", ch.name), Style::default().fg(Color::White)),
                Span::styled(
                    format!("{:>10.1}", ch.value),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {}", direction_arrow(ch)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(" ["),
                Span::styled(
                    fill_bar(ch.ratio(), RANGE_BAR_WIDTH),
                    Style::default().fg(Color::Blue),
                ),
                Span::raw("] "),
                Span::styled(
                    trend_line(ch.history.values(), ch.min, ch.max, trend_width),
                    Style::default().fg(Color::Cyan),
                ),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines), inner);
}
