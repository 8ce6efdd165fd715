//! Core application state types and constants.
//!
//! This module contains the fundamental data structures shared by the
//! reconciler, the poll loop and the UI: entries, snapshots and per-chart state.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use strum::{Display, EnumIter};
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Default interval between polls of a chart's endpoint
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default duration of bar enter/update/exit transitions
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(250);

/// Default tooltip fade in/out duration
pub const DEFAULT_TOOLTIP_FADE: Duration = Duration::from_millis(50);

/// Row height of a bar in the frequency chart (bar itself is one pixel shorter)
pub const FREQUENCY_BAR_HEIGHT: f32 = 25.0;

/// Fixed canvas height of the bucket chart
pub const BUCKET_CHART_HEIGHT: f32 = 700.0;

/// Fraction of a band slot covered by a bucket bar
pub const BUCKET_BAR_FILL: f32 = 0.9;

/// Number of ticks requested for the frequency chart's count axis
pub const AXIS_TICK_COUNT: usize = 5;

/// Number of ticks requested for the bucket chart's count axis
pub const BUCKET_Y_TICK_COUNT: usize = 10;

/// Fill opacity of a bar under the pointer
pub const HOVER_FILL_OPACITY: f32 = 0.7;

/// Fill opacity of bars not under the pointer
pub const IDLE_FILL_OPACITY: f32 = 0.3;

/// Bar fill colour (steel blue)
pub const BAR_COLOR: [u8; 3] = [70, 130, 180];

/// Colour of frequency labels while hovered
pub const LINK_HOVER_COLOR: [u8; 3] = [0, 0, 255];

/// Outer margins of a chart canvas in pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

/// Margins of the horizontal frequency chart
pub const FREQUENCY_MARGINS: Margins = Margins {
    top: 50.0,
    right: 10.0,
    bottom: 20.0,
    left: 5.0,
};

/// Margins of the vertical bucket chart
pub const BUCKET_MARGINS: Margins = Margins {
    top: 50.0,
    right: 10.0,
    bottom: 100.0,
    left: 65.0,
};

// ============================================================================
// Core Types
// ============================================================================

/// One bar: a label and its (approximate) count.
///
/// `label` is the identity of the bar across polling cycles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub label: String,
    pub count: f64,
}

impl Entry {
    pub fn new(label: impl Into<String>, count: f64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// One polling result as returned by a counts endpoint
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Number of observations in the current time window (display only)
    pub positions_in_window: f64,
    /// Label/count pairs, in whatever order the backend produced them
    pub label_counts: Vec<Entry>,
}

/// A snapshot that breaks the data contract
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SnapshotError {
    /// The same label appears more than once
    #[error("duplicate label '{0}' in snapshot")]
    DuplicateLabel(String),

    /// A count is NaN or infinite
    #[error("non-finite count for label '{0}'")]
    NonFiniteCount(String),
}

impl Snapshot {
    pub fn new(positions_in_window: f64, label_counts: Vec<Entry>) -> Self {
        Self {
            positions_in_window,
            label_counts,
        }
    }

    /// Check the invariants the reconciler relies on (unique labels, finite counts)
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut seen = HashSet::with_capacity(self.label_counts.len());
        for entry in &self.label_counts {
            if !entry.count.is_finite() {
                return Err(SnapshotError::NonFiniteCount(entry.label.clone()));
            }
            if !seen.insert(entry.label.as_str()) {
                return Err(SnapshotError::DuplicateLabel(entry.label.clone()));
            }
        }
        Ok(())
    }

    /// Largest count in the snapshot, 0 when empty
    pub fn max_count(&self) -> f64 {
        max_count(&self.label_counts)
    }
}

/// Largest count of `entries`; an empty slice yields a 0 domain
pub fn max_count(entries: &[Entry]) -> f64 {
    entries
        .iter()
        .map(|e| e.count)
        .fold(None, |acc: Option<f64>, c| Some(acc.map_or(c, |m| m.max(c))))
        .unwrap_or(0.0)
}

/// The two chart flavours on the dashboard
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ChartKind {
    /// Ranked horizontal bars, highest count on top
    #[strum(to_string = "frequency")]
    Frequency,
    /// Vertical bars ordered by the numeric prefix of their label
    #[strum(to_string = "bucket")]
    Bucket,
}

/// Mutable per-chart state owned by the poll loop.
///
/// Never shared between the two charts.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartState {
    /// Backend granularity parameter `k`
    pub parameter_k: u64,
    /// Last successfully fetched snapshot
    pub latest_snapshot: Snapshot,
    /// Width available to the chart canvas in pixels
    pub viewport_width: f32,
}

impl ChartState {
    pub fn new(parameter_k: u64, viewport_width: f32) -> Self {
        Self {
            parameter_k,
            latest_snapshot: Snapshot::default(),
            viewport_width,
        }
    }
}

/// Toast notification severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ToastType {
    /// Informational message (blue)
    #[default]
    Info,
    /// Warning message (amber)
    Warning,
    /// Error message (red)
    Error,
}

impl ToastType {
    /// Get the background color for this toast type
    pub fn color(&self) -> [u8; 3] {
        match self {
            ToastType::Info => [71, 108, 155],  // Blue
            ToastType::Warning => [253, 193, 73], // Amber
            ToastType::Error => [135, 30, 28],  // Dark red
        }
    }

    /// Get the text color for this toast type
    pub fn text_color(&self) -> [u8; 3] {
        match self {
            ToastType::Warning => [30, 30, 30], // Dark text for amber background
            _ => [255, 255, 255],
        }
    }
}
