//! UI rendering modules for the livecounts dashboard.
//!
//! - `chart` - Chart canvas: axes, animated bars, hover and label links
//! - `controls` - Chart header with window size, parameter slider and status
//! - `tooltip` - Hover tooltip overlay
//! - `toast` - Toast notification system

pub mod chart;
pub mod controls;
pub mod toast;
pub mod tooltip;
