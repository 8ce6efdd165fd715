//! Chart geometry derived from the current entries and viewport width.

use crate::animation::BarGeometry;
use crate::scale::{BandScale, LinearScale};
use crate::state::{
    max_count, ChartKind, Entry, Margins, BUCKET_BAR_FILL, BUCKET_CHART_HEIGHT, BUCKET_MARGINS,
    FREQUENCY_BAR_HEIGHT, FREQUENCY_MARGINS,
};

/// Scales for one render pass
#[derive(Clone, Debug, PartialEq)]
pub enum ChartScales {
    /// Horizontal bars: count → bar width
    Frequency { x: LinearScale },
    /// Vertical bars: label → slot, count → top edge
    Bucket { x: BandScale, y: LinearScale },
}

/// Canvas size, margins and scales of one chart for one frame
#[derive(Clone, Debug, PartialEq)]
pub struct ChartLayout {
    pub kind: ChartKind,
    pub margins: Margins,
    /// Full canvas width
    pub width: f32,
    /// Full canvas height
    pub height: f32,
    pub plot_width: f32,
    pub plot_height: f32,
    pub scales: ChartScales,
}

impl ChartLayout {
    /// Compute the layout for `entries`, which must already be in chart order.
    pub fn compute(kind: ChartKind, entries: &[Entry], viewport_width: f32) -> Self {
        let max = max_count(entries).max(0.0);
        let width = viewport_width.max(0.0);

        match kind {
            ChartKind::Frequency => {
                let margins = FREQUENCY_MARGINS;
                let plot_width = (width - margins.left - margins.right).max(0.0);
                let plot_height = FREQUENCY_BAR_HEIGHT * entries.len() as f32;
                Self {
                    kind,
                    margins,
                    width,
                    height: plot_height + margins.top + margins.bottom,
                    plot_width,
                    plot_height,
                    scales: ChartScales::Frequency {
                        x: LinearScale::new((0.0, max), (0.0, plot_width)),
                    },
                }
            }
            ChartKind::Bucket => {
                let margins = BUCKET_MARGINS;
                let plot_width = (width - margins.left - margins.right).max(0.0);
                let plot_height = BUCKET_CHART_HEIGHT - margins.top - margins.bottom;
                let labels = entries.iter().map(|e| e.label.clone()).collect();
                Self {
                    kind,
                    margins,
                    width,
                    height: BUCKET_CHART_HEIGHT,
                    plot_width,
                    plot_height,
                    scales: ChartScales::Bucket {
                        x: BandScale::new(labels, (0.0, plot_width)),
                        y: LinearScale::new((0.0, max), (plot_height, 0.0)),
                    },
                }
            }
        }
    }

    /// Settled geometry of the bar at `rank`
    pub fn bar_geometry(&self, rank: usize, entry: &Entry) -> BarGeometry {
        match &self.scales {
            ChartScales::Frequency { x } => BarGeometry::new(
                0.0,
                rank as f32 * FREQUENCY_BAR_HEIGHT,
                x.map(entry.count).max(0.0),
                FREQUENCY_BAR_HEIGHT - 1.0,
            ),
            ChartScales::Bucket { x, y } => {
                let top = y.map(entry.count).min(self.plot_height);
                BarGeometry::new(
                    x.position(&entry.label).unwrap_or_else(|| x.position_at(rank)),
                    top,
                    BUCKET_BAR_FILL * x.bandwidth(),
                    self.plot_height - top,
                )
            }
        }
    }

    /// Zero-extent geometry a new bar grows out of
    pub fn entering_geometry(&self, rank: usize, entry: &Entry) -> BarGeometry {
        let target = self.bar_geometry(rank, entry);
        match self.kind {
            ChartKind::Frequency => BarGeometry { width: 0.0, ..target },
            ChartKind::Bucket => BarGeometry {
                y: self.plot_height,
                height: 0.0,
                ..target
            },
        }
    }

    /// Canvas offset of the bar group (bar geometry is relative to it)
    pub fn bars_origin(&self) -> (f32, f32) {
        (self.margins.left, self.margins.top)
    }
}
