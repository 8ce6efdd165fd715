//! LiveCounts - live-updating bar charts of approximate counts
//!
//! This library polls counts endpoints and renders their snapshots as two
//! animated bar charts: a ranked frequency chart with horizontal bars and a
//! bucket chart with vertical bars ordered by numeric label prefix.
//!
//! ## Module Structure
//!
//! - [`app`] - Main application state and eframe::App implementation
//! - [`state`] - Core data types and constants
//! - [`ordering`] - Frequency and bucket ordering policies
//! - [`scale`] - Linear and band scales with tick generation
//! - [`layout`] - Per-chart canvas size, scales and bar geometry
//! - [`animation`] - Eased tweens between bar appearances
//! - [`reconciler`] - Keyed enter/update/exit join of snapshots onto bars
//! - [`tooltip`] - Shared hover tooltip controller
//! - [`source`] - Snapshot sources (HTTP counts endpoints)
//! - [`poll`] - Poll timer and fetch sequencing per chart
//! - [`format`] - Number formatting and slider mapping
//! - [`settings`] - User settings persistence
//! - [`ui`] - User interface components
//!   - `chart` - Chart canvas, axes and bars
//!   - `controls` - Chart header and parameter slider
//!   - `tooltip` - Tooltip overlay
//!   - `toast` - Toast notification system

pub mod animation;
pub mod app;
pub mod format;
pub mod layout;
pub mod ordering;
pub mod poll;
pub mod reconciler;
pub mod scale;
pub mod settings;
pub mod source;
pub mod state;
pub mod tooltip;
pub mod ui;
