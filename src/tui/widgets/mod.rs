//! # Module: TUI Widgets
//!
//! ## Responsibility
//! Individual rendering widgets for each dashboard panel. Each widget is a pure
//! function that takes app state and a layout rect, and renders into a frame.
//!
//! ## Guarantees
//! - All widgets handle zero-data gracefully (empty state rendering)
//! - No widget panics on any input range
//! - Color-coded thresholds are consistent across all bar-style widgets

pub mod alerts;
pub mod features;
pub mod gauges;
pub mod overview;
pub mod predictions;
pub mod trends;
