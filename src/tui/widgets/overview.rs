//! # Widget: Model Overview
//!
//! ## Responsibility
//! Renders the backend's view of the model: health gauge and label, drift
//! summary, retraining recommendation, and the poll status banner
//! (loading, error, or stale data).
//!
//! ## Guarantees
//! - Every poll state has a distinct rendering; errors are never hidden
//! - Health percentage clamped to 0-100
//! - Never panics on any snapshot content

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::gauges::fill_bar;
use crate::api::{DashboardSnapshot, RecommendedAction, HEALTHY_THRESHOLD};
use crate::poller::{PollStatus, UNAVAILABLE_MESSAGE};
use crate::tui::app::App;

/// Bar width for the health gauge.
const HEALTH_BAR_WIDTH: usize = 20;

/// Color for a health score: green when healthy, yellow near the threshold,
/// red well below it.
pub fn health_color(score: f64) -> Color {
    if score >= HEALTHY_THRESHOLD {
        Color::Green
    } else if score >= HEALTHY_THRESHOLD - 20.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

/// Renders the overview widget.
///
/// # Arguments
/// * `f` - Ratatui frame to render into.
/// * `area` - Rectangular area allocated for this widget.
/// * `app` - Application state containing the poller state.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" MODEL HEALTH ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = match (app.poll_status(), app.poller.snapshot.as_ref()) {
        (None, _) => vec![Line::from(Span::styled(
            "Backend polling disabled (simulated feed only)",
            Style::default().fg(Color::DarkGray),
        ))],
        (Some(PollStatus::Loading), _) => vec![Line::from(Span::styled(
            "Loading dashboard data\u{2026}",
            Style::default().fg(Color::Cyan),
        ))],
        (Some(PollStatus::Error), _) | (Some(PollStatus::Ready), None) => {
            error_lines(app.poller.error.as_deref())
        }
        (Some(PollStatus::Ready), Some(snapshot)) => {
            let mut lines = snapshot_lines(snapshot);
            if app.poller.is_stale() {
                lines.push(Line::from(Span::styled(
                    format!(
                        "\u{26a0} Stale: {}",
                        app.poller.error.as_deref().unwrap_or("last poll failed")
                    ),
                    Style::default().fg(Color::Yellow),
                )));
            }
            lines
        }
    };

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn error_lines(detail: Option<&str>) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        UNAVAILABLE_MESSAGE,
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    ))];
    if let Some(detail) = detail {
        lines.push(Line::from(Span::styled(
            detail.to_string(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(Span::styled(
        "Retrying on the next poll interval",
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

fn snapshot_lines(snapshot: &DashboardSnapshot) -> Vec<Line<'static>> {
    let color = health_color(snapshot.health_score);
    let summary = &snapshot.drift_summary;

    let mut lines = vec![
        Line::from(vec![
            Span::styled("HEALTH ", Style::default().fg(Color::White)),
            Span::styled(
                fill_bar(snapshot.health_ratio(), HEALTH_BAR_WIDTH),
                Style::default().fg(color),
            ),
            Span::styled(
                format!(" {:.0}% ", snapshot.health_score.clamp(0.0, 100.0)),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                snapshot.health_label(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("DRIFT  ", Style::default().fg(Color::White)),
            Span::styled(
                format!(
                    "{}/{} features drifting (score {:.2})",
                    summary.drifting_count, summary.total_count, summary.score
                ),
                Style::default().fg(Color::Gray),
            ),
        ]),
    ];

    if let Some(rec) = &summary.recommendation {
        let rec_color = match rec.action {
            RecommendedAction::RetrainUrgent => Color::Red,
            RecommendedAction::Monitor => Color::Green,
            RecommendedAction::Other(_) => Color::Yellow,
        };
        let eta = rec
            .estimated_time
            .as_deref()
            .map(|t| format!(" (est. {t})"))
            .unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled("ACTION ", Style::default().fg(Color::White)),
            Span::styled(
                format!("{}{eta}", rec.action.label()),
                Style::default().fg(rec_color).add_modifier(Modifier::BOLD),
            ),
        ]));
    }

    for metric in snapshot.metrics.iter().take(3) {
        let change_color = if metric.change < 0.0 {
            Color::Red
        } else {
            Color::Green
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<18.18}", metric.label),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(format!("{:>10}", metric.value), Style::default().fg(Color::White)),
            Span::styled(
                format!(" {:+.1}%", metric.change),
                Style::default().fg(change_color),
            ),
        ]));
    }

    lines
}
