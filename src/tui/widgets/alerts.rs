//! # Widget: Alert Stream
//!
//! ## Responsibility
//! Renders the simulated alert feed newest-first with color-coded severity
//! and relative age, highlighting the selected alert.
//!
//! ## Guarantees
//! - Fixed-width age and severity columns for alignment
//! - Long messages truncated with `…` rather than wrapping
//! - Handles an empty feed gracefully

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::api::Severity;
use crate::tui::app::App;

/// Returns the display color for a severity.
///
/// # Returns
/// Red for Critical, Yellow for Warning, Cyan for Info.
pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Critical => Color::Red,
        Severity::Warning => Color::Yellow,
        Severity::Info => Color::Cyan,
    }
}

/// Truncates a string to at most `max_width` characters, adding `…` if
/// truncated.
pub fn truncate_with_ellipsis(s: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if s.chars().count() <= max_width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_width - 1).collect();
    out.push('\u{2026}');
    out
}

/// Renders the alert stream widget.
///
/// # Arguments
/// * `f` - Ratatui frame to render into.
/// * `area` - Rectangular area allocated for this widget.
/// * `app` - Application state containing the alert snapshot.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let counts = app.feed.alert_counts;
    let title = format!(
        " ALERTS ({}) \u{2022} {} crit {} warn {} info ",
        counts.total(),
        counts.critical,
        counts.warning,
        counts.info
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.feed.alerts.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(
                "No active alerts",
                Style::default().fg(Color::Green),
            )),
            inner,
        );
        return;
    }

    let visible = inner.height as usize;
    let skip = app.selected_alert.saturating_sub(visible.saturating_sub(1));
    let max_line_width = inner.width as usize;

    let lines: Vec<Line> = app
        .feed
        .alerts
        .iter()
        .enumerate()
        .skip(skip)
        .take(visible)
        .map(|(i, alert)| {
            let selected = i == app.selected_alert;
            let color = severity_color(alert.severity);
            let marker = if selected { "\u{25b6} " } else { "  " };
            let age = format!("{:>9} ", alert.label(app.now));
            let sev = format!("{:<8} ", alert.severity.label());
            let used = marker.chars().count() + age.len() + sev.len();
            let body = truncate_with_ellipsis(&alert.message, max_line_width.saturating_sub(used));

            let mut body_style = Style::default().fg(Color::White);
            if selected {
                body_style = body_style.add_modifier(Modifier::REVERSED);
            }
            Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Cyan)),
                Span::styled(age, Style::default().fg(Color::DarkGray)),
                Span::styled(sev, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::styled(body, body_style),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines), inner);
}
