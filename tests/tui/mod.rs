//! Integration tests for the live monitoring TUI.
//!
//! These tests verify cross-module interactions: app state driven by a real
//! `LiveFeed` and poller state, key handling end to end, and full-frame
//! rendering of every poll state on a test backend.

#[cfg(feature = "tui")]
mod app_state;
#[cfg(feature = "tui")]
mod widget_tests;
