//! # Module: TUI Dashboard
//!
//! ## Responsibility
//! Terminal rendition of the DriftGuard live monitoring view using Ratatui:
//! model health from the backend snapshot, prediction counter, channel
//! trends, drift gauges, the alert stream and a feature drill-down.
//!
//! ## Guarantees
//! - No panics in any rendering or update path
//! - Clean terminal restore on exit, including on panic
//! - Graceful resize handling down to 100x32 minimum
//! - 10fps rendering, independent of the feed and poll intervals
//!
//! ## NOT Responsible For
//! - Running the feed or the poller (the binary owns both and hands
//!   snapshots to [`app::App`])
//! - Persisting anything

pub mod app;
pub mod events;
pub mod ui;
pub mod widgets;
