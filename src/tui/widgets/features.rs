//! # Widget: Feature Details
//!
//! ## Responsibility
//! Renders the drill-down for one feature: PSI and status, then the
//! training-vs-production statistics table with percentage change.
//!
//! ## Guarantees
//! - Every panel state (idle, loading, loaded, failed) renders distinctly
//! - Undefined percentage changes render as "n/a"

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::gauges::status_color;
use crate::api::{FeatureDetails, StatRow};
use crate::tui::app::{App, DetailsPanel};

/// Absolute change (in percent) above which a flagged statistic is highlighted.
pub const CHANGE_HIGHLIGHT_PCT: f64 = 10.0;

/// Formats a percentage change, `n/a` when undefined.
pub fn format_change(change: Option<f64>) -> String {
    match change {
        Some(c) => format!("{c:+.1}%"),
        None => "n/a".to_string(),
    }
}

/// Color for one statistics row.
pub fn change_color(row: &StatRow) -> Color {
    match row.change_pct {
        Some(c) if row.flagged && c.abs() > CHANGE_HIGHLIGHT_PCT => Color::Red,
        Some(_) => Color::Green,
        None => Color::DarkGray,
    }
}

/// Renders the feature details widget.
///
/// # Arguments
/// * `f` - Ratatui frame to render into.
/// * `area` - Rectangular area allocated for this widget.
/// * `app` - Application state containing the details panel.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let title = match &app.details {
        DetailsPanel::Idle => " FEATURE DETAILS ".to_string(),
        DetailsPanel::Loading(name)
        | DetailsPanel::Loaded { name, .. }
        | DetailsPanel::Failed { name, .. } => format!(" FEATURE: {name} "),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = match &app.details {
        DetailsPanel::Idle => vec![Line::from(Span::styled(
            "Press [f] to inspect the most drifting feature",
            Style::default().fg(Color::DarkGray),
        ))],
        DetailsPanel::Loading(_) => vec![Line::from(Span::styled(
            "Loading feature details\u{2026}",
            Style::default().fg(Color::Cyan),
        ))],
        DetailsPanel::Failed { error, .. } => vec![
            Line::from(Span::styled(
                "Could not load feature details",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(error.clone(), Style::default().fg(Color::DarkGray))),
        ],
        DetailsPanel::Loaded { details, .. } => detail_lines(details),
    };

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn detail_lines(details: &FeatureDetails) -> Vec<Line<'static>> {
    let status = details.drift_status();
    let mut lines = vec![
        Line::from(vec![
            Span::styled("PSI ", Style::default().fg(Color::White)),
            Span::styled(
                format!("{:.3} ", details.psi),
                Style::default().fg(status_color(status)).add_modifier(Modifier::BOLD),
            ),
            Span::styled(status.label(), Style::default().fg(status_color(status))),
            Span::styled(
                format!("  {} bins", details.chart_data.len()),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(Span::styled(
            format!("{:<9}{:>12}{:>12}{:>10}", "", "Training", "Production", "Change"),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    for row in details.stat_rows() {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<9}", row.metric), Style::default().fg(Color::White)),
            Span::styled(
                format!("{:>12.2}{:>12.2}", row.training, row.production),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(
                format!("{:>10}", format_change(row.change_pct)),
                Style::default().fg(change_color(&row)),
            ),
        ]));
    }
    lines
}
