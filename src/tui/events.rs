//! # Module: TUI Event Handling
//!
//! ## Responsibility
//! Polls crossterm events and translates keyboard input into app state
//! mutations. Anything that must touch the feed or the backend is returned as
//! an [`Action`] for the event loop to execute.
//!
//! ## Guarantees
//! - Non-blocking event polling with configurable timeout
//! - No panics on any key combination
//! - Ctrl+C always triggers quit, even with the help overlay open

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::{App, DetailsPanel};
use crate::feed::alerts::AlertId;

/// Result of polling for a terminal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// q, Esc or Ctrl+C.
    Quit,
    /// p or space.
    TogglePlay,
    /// r.
    Reset,
    /// h.
    Help,
    /// Up arrow.
    SelectUp,
    /// Down arrow.
    SelectDown,
    /// d.
    Dismiss,
    /// f.
    FeatureDetails,
    /// x.
    ForceDrift,
    /// Any other key.
    OtherKey,
    /// A terminal resize occurred.
    Resize(u16, u16),
    /// No actionable event within the poll window.
    None,
}

/// Side effect the event loop must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Pause or resume the simulated feed.
    TogglePlay,
    /// Rebuild the simulated feed from configuration.
    Reset,
    /// Remove an alert from the feed.
    Dismiss(AlertId),
    /// Fetch feature details from the backend.
    LoadFeature(String),
    /// Switch the simulated drift bias on.
    ForceDrift,
}

/// Polls for a single input event with the given timeout.
///
/// # Arguments
/// * `timeout` - Maximum time to wait for an event.
///
/// # Returns
/// The detected `InputEvent`, or `InputEvent::None` if no event occurred or
/// polling failed.
pub fn poll_event(timeout: Duration) -> InputEvent {
    let available = match event::poll(timeout) {
        Ok(v) => v,
        Err(_) => return InputEvent::None,
    };
    if !available {
        return InputEvent::None;
    }

    match event::read() {
        Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => translate_key(key),
        Ok(Event::Resize(w, h)) => InputEvent::Resize(w, h),
        _ => InputEvent::None,
    }
}

/// Applies an input event to the app state.
///
/// While the help overlay is open, any key closes it and is otherwise
/// ignored (except quit).
///
/// # Returns
/// The side effect the caller must perform, if any.
pub fn apply_event(app: &mut App, event: InputEvent) -> Option<Action> {
    if app.show_help {
        match event {
            InputEvent::Quit => app.should_quit = true,
            InputEvent::Resize(_, _) | InputEvent::None => {}
            _ => app.show_help = false,
        }
        return None;
    }

    match event {
        InputEvent::Quit => {
            app.should_quit = true;
            None
        }
        InputEvent::Help => {
            app.show_help = true;
            None
        }
        InputEvent::SelectUp => {
            app.select_prev();
            None
        }
        InputEvent::SelectDown => {
            app.select_next();
            None
        }
        InputEvent::TogglePlay => Some(Action::TogglePlay),
        InputEvent::Reset => Some(Action::Reset),
        InputEvent::ForceDrift => Some(Action::ForceDrift),
        InputEvent::Dismiss => app.selected().map(|a| Action::Dismiss(a.id)),
        InputEvent::FeatureDetails => match app.top_feature().map(|f| f.name.clone()) {
            Some(name) => {
                app.details = DetailsPanel::Loading(name.clone());
                Some(Action::LoadFeature(name))
            }
            None => {
                app.set_status("No drifting features yet: waiting for backend snapshot");
                None
            }
        },
        InputEvent::OtherKey | InputEvent::Resize(_, _) | InputEvent::None => None,
    }
}

/// Translates a crossterm key event to an `InputEvent`.
pub fn translate_key(key: KeyEvent) -> InputEvent {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return InputEvent::Quit;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => InputEvent::Quit,
        KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Char(' ') => InputEvent::TogglePlay,
        KeyCode::Char('r') | KeyCode::Char('R') => InputEvent::Reset,
        KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => InputEvent::Help,
        KeyCode::Char('d') | KeyCode::Char('D') => InputEvent::Dismiss,
        KeyCode::Char('f') | KeyCode::Char('F') => InputEvent::FeatureDetails,
        KeyCode::Char('x') | KeyCode::Char('X') => InputEvent::ForceDrift,
        KeyCode::Up | KeyCode::Char('k') => InputEvent::SelectUp,
        KeyCode::Down | KeyCode::Char('j') => InputEvent::SelectDown,
        _ => InputEvent::OtherKey,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AlertConfig, FeedConfig};
    use crate::feed::LiveFeed;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        let feed = LiveFeed::new(
            FeedConfig {
                seed: Some(9),
                ..FeedConfig::default()
            },
            AlertConfig::default(),
        );
        App::new(feed.snapshot(), true)
    }

    #[test]
    fn test_translate_key_quit_variants() {
        assert_eq!(translate_key(key(KeyCode::Char('q'))), InputEvent::Quit);
        assert_eq!(translate_key(key(KeyCode::Char('Q'))), InputEvent::Quit);
        assert_eq!(translate_key(key(KeyCode::Esc)), InputEvent::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(translate_key(ctrl_c), InputEvent::Quit);
    }

    #[test]
    fn test_translate_key_space_and_p_toggle_play() {
        assert_eq!(translate_key(key(KeyCode::Char(' '))), InputEvent::TogglePlay);
        assert_eq!(translate_key(key(KeyCode::Char('p'))), InputEvent::TogglePlay);
    }

    #[test]
    fn test_translate_key_arrows_select() {
        assert_eq!(translate_key(key(KeyCode::Up)), InputEvent::SelectUp);
        assert_eq!(translate_key(key(KeyCode::Down)), InputEvent::SelectDown);
    }

    #[test]
    fn test_translate_key_unknown_is_other() {
        assert_eq!(translate_key(key(KeyCode::Char('z'))), InputEvent::OtherKey);
    }

    #[test]
    fn test_apply_event_quit_sets_flag() {
        let mut app = app();
        assert_eq!(apply_event(&mut app, InputEvent::Quit), None);
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_opens_and_any_key_closes() {
        let mut app = app();
        apply_event(&mut app, InputEvent::Help);
        assert!(app.show_help);
        assert_eq!(apply_event(&mut app, InputEvent::TogglePlay), None);
        assert!(!app.show_help);
    }

    #[test]
    fn test_quit_works_inside_help() {
        let mut app = app();
        app.show_help = true;
        apply_event(&mut app, InputEvent::Quit);
        assert!(app.should_quit);
    }

    #[test]
    fn test_toggle_and_reset_are_actions() {
        let mut app = app();
        assert_eq!(apply_event(&mut app, InputEvent::TogglePlay), Some(Action::TogglePlay));
        assert_eq!(apply_event(&mut app, InputEvent::Reset), Some(Action::Reset));
    }

    #[test]
    fn test_x_forces_drift() {
        let mut app = app();
        let event = translate_key(key(KeyCode::Char('x')));
        assert_eq!(event, InputEvent::ForceDrift);
        assert_eq!(apply_event(&mut app, event), Some(Action::ForceDrift));
    }

    #[test]
    fn test_dismiss_targets_selected_alert() {
        let mut app = app();
        apply_event(&mut app, InputEvent::SelectDown);
        let expected = app.feed.alerts[1].id;
        assert_eq!(
            apply_event(&mut app, InputEvent::Dismiss),
            Some(Action::Dismiss(expected))
        );
    }

    #[test]
    fn test_dismiss_with_no_alerts_is_noop() {
        let mut app = app();
        app.feed.alerts.clear();
        assert_eq!(apply_event(&mut app, InputEvent::Dismiss), None);
    }

    #[test]
    fn test_feature_details_without_snapshot_sets_status() {
        let mut app = app();
        assert_eq!(apply_event(&mut app, InputEvent::FeatureDetails), None);
        assert!(app.status.is_some());
        assert_eq!(app.details, DetailsPanel::Idle);
    }

    #[test]
    fn test_resize_and_none_are_noops() {
        let mut app = app();
        assert_eq!(apply_event(&mut app, InputEvent::Resize(200, 60)), None);
        assert_eq!(apply_event(&mut app, InputEvent::None), None);
        assert!(!app.should_quit);
    }
}
