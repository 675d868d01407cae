//! # Widget: Drift Gauges
//!
//! ## Responsibility
//! Renders one fill bar per top drifting feature from the backend snapshot,
//! scaled so PSI 0.5 fills the bar. Also hosts the fill-bar helpers the other
//! bar-style widgets share.
//!
//! ## Guarantees
//! - Fill bars render correctly at 0%, 50%, 85%, and 100%
//! - Never panics on any PSI value, including negatives and NaN
//! - Renders a placeholder when no snapshot is available

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::api::DriftStatus;
use crate::tui::app::App;

/// Bar width in characters for drift gauges.
const BAR_WIDTH: usize = 18;

/// PSI that fills a gauge completely.
pub const PSI_FULL_SCALE: f64 = 0.5;

/// Returns the color for a fill ratio where higher is worse.
///
/// # Returns
/// Green if <=0.60, Yellow if 0.60-0.85, Red if >0.85.
pub fn fill_color(ratio: f64) -> Color {
    if ratio > 0.85 {
        Color::Red
    } else if ratio > 0.60 {
        Color::Yellow
    } else {
        Color::Green
    }
}

/// Builds a fill bar string using Unicode block characters.
///
/// # Arguments
/// * `ratio` - Fill ratio from 0.0 to 1.0; out-of-range and NaN are clamped.
/// * `width` - Total bar width in characters.
pub fn fill_bar(ratio: f64, width: usize) -> String {
    let clamped = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
    let filled = (clamped * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("{}{}", "\u{2588}".repeat(filled), "\u{2591}".repeat(empty))
}

/// Color for a drift classification.
pub fn status_color(status: DriftStatus) -> Color {
    match status {
        DriftStatus::Critical => Color::Red,
        DriftStatus::Warning => Color::Yellow,
        DriftStatus::Good => Color::Green,
    }
}

/// Renders the drift gauges widget.
///
/// # Arguments
/// * `f` - Ratatui frame to render into.
/// * `area` - Rectangular area allocated for this widget.
/// * `app` - Application state containing the remote snapshot.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" DRIFT (PSI) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let features = app
        .poller
        .snapshot
        .as_ref()
        .map(|s| s.top_features.as_slice())
        .unwrap_or_default();

    if features.is_empty() {
        let msg = if app.poll_enabled {
            "No feature drift data yet"
        } else {
            "Backend polling disabled"
        };
        f.render_widget(
            Paragraph::new(Span::styled(msg, Style::default().fg(Color::DarkGray))),
            inner,
        );
        return;
    }

    let lines: Vec<Line> = features
        .iter()
        .take(inner.height as usize)
        .map(|feat| {
            let color = status_color(feat.status);
            Line::from(vec![
                Span::styled(
                    format!("{:<14.14}", feat.name),
                    Style::default().fg(Color::White),
                ),
                Span::raw("["),
                Span::styled(
                    fill_bar(feat.psi / PSI_FULL_SCALE, BAR_WIDTH),
                    Style::default().fg(color),
                ),
                Span::raw("] "),
                Span::styled(format!("{:.2}", feat.psi), Style::default().fg(color)),
                Span::styled(
                    format!(" {}", feat.status.label()),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines), inner);
}
