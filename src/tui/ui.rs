//! # Module: TUI Rendering
//!
//! ## Responsibility
//! Orchestrates the overall dashboard layout by dividing the terminal into regions
//! and delegating to individual widget renderers. Handles the minimum size guard
//! and help overlay.
//!
//! ## Guarantees
//! - Layout adapts to terminal sizes from 100x32 upwards
//! - Minimum size guard displays a centered message if terminal is too small
//! - No panics during rendering regardless of terminal dimensions

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::app::{App, MIN_COLS, MIN_ROWS, MODEL_NAME};
use super::widgets;
use crate::poller::PollStatus;

/// Help popup width.
const HELP_WIDTH: u16 = 52;

/// Help popup height.
const HELP_HEIGHT: u16 = 17;

/// Renders the complete dashboard UI into the given frame.
///
/// # Arguments
/// * `f` - The Ratatui frame to render into.
/// * `app` - The application state to display.
pub fn draw(f: &mut Frame, app: &App) {
    let size = f.area();

    if size.width < MIN_COLS || size.height < MIN_ROWS {
        draw_too_small(f, size);
        return;
    }

    let (state_label, state_color) = if app.is_playing() {
        ("\u{25cf} LIVE", Color::Green)
    } else {
        ("\u{275a}\u{275a} PAUSED", Color::Yellow)
    };
    let title = Line::from(vec![
        Span::styled(
            " DriftGuard Live Monitoring ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("\u{2502} {MODEL_NAME} \u{2502} "), Style::default().fg(Color::Gray)),
        Span::styled(
            state_label,
            Style::default().fg(state_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                " \u{2502} updated {} ",
                app.feed
                    .last_update
                    .with_timezone(&chrono::Local)
                    .format("%H:%M:%S")
            ),
            Style::default().fg(Color::DarkGray),
        ),
        poll_badge(app),
    ]);

    let outer_block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let mut footer = vec![Span::styled(
        " [q]uit  [p]lay/pause  [\u{2191}\u{2193}] select  [d]ismiss  [f]eature  [r]eset  [h]elp ",
        Style::default().fg(Color::DarkGray),
    )];
    if let Some(status) = &app.status {
        footer.push(Span::styled(
            format!(" {status} "),
            Style::default().fg(Color::Yellow),
        ));
    }
    let footer_block = Block::default()
        .title_bottom(Line::from(footer))
        .borders(Borders::NONE);

    let inner = outer_block.inner(size);
    f.render_widget(outer_block, size);
    f.render_widget(footer_block, size);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Health overview + predictions
            Constraint::Min(8),    // Trends + drift gauges
            Constraint::Length(12), // Alerts + feature details
        ])
        .split(inner);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[2]);

    widgets::overview::render(f, top[0], app);
    widgets::predictions::render(f, top[1], app);
    widgets::trends::render(f, middle[0], app);
    widgets::gauges::render(f, middle[1], app);
    widgets::alerts::render(f, bottom[0], app);
    widgets::features::render(f, bottom[1], app);

    if app.show_help {
        draw_help_overlay(f, size);
    }
}

/// Short poll state badge for the title bar.
fn poll_badge(app: &App) -> Span<'static> {
    match app.poll_status() {
        None => Span::styled("backend: off ", Style::default().fg(Color::DarkGray)),
        Some(PollStatus::Loading) => Span::styled("backend: loading ", Style::default().fg(Color::Cyan)),
        Some(PollStatus::Error) => Span::styled(
            "backend: unreachable ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Some(PollStatus::Ready) if app.poller.is_stale() => {
            Span::styled("backend: stale ", Style::default().fg(Color::Yellow))
        }
        Some(PollStatus::Ready) => Span::styled("backend: ok ", Style::default().fg(Color::Green)),
    }
}

/// Renders the "terminal too small" warning.
fn draw_too_small(f: &mut Frame, area: Rect) {
    let msg = format!("Terminal too small: resize to at least {MIN_COLS}x{MIN_ROWS}");
    let current_size = format!("Current size: {}x{}", area.width, area.height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let para = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            msg,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            current_size,
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(block)
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    f.render_widget(para, area);
}

/// Centers a popup of at most `width` x `height` inside `area`, keeping a
/// two-cell margin.
pub fn popup_rect(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(4));
    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    Rect::new(popup_x, popup_y, popup_width, popup_height)
}

/// Renders the help overlay.
fn draw_help_overlay(f: &mut Frame, area: Rect) {
    let popup_area = popup_rect(area, HELP_WIDTH, HELP_HEIGHT);
    f.render_widget(Clear, popup_area);

    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("    {k:<12}"), Style::default().fg(Color::White)),
            Span::styled(what, Style::default().fg(Color::DarkGray)),
        ])
    };

    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  DriftGuard live monitoring",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        key("q / Esc", "Quit"),
        key("Ctrl+C", "Force quit"),
        key("p / Space", "Play / pause the live feed"),
        key("\u{2191} / \u{2193}", "Select alert"),
        key("d", "Dismiss selected alert"),
        key("f", "Load details for the top drifting feature"),
        key("r", "Reset the simulation"),
        key("x", "Force model drift now"),
        key("h", "Toggle this help"),
        Line::from(""),
        Line::from(Span::styled(
            "  Metrics and alerts are simulated; health and",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "  drift come from the backend snapshot.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "  Press any key to close",
            Style::default().fg(Color::Yellow),
        )),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    f.render_widget(Paragraph::new(help_text).block(block), popup_area);
}
