//! Hover tooltip shared by both charts.
//!
//! Charts never touch tooltip state directly; they send [`TooltipEvent`]s and
//! the controller decides what is shown. The controller remembers which chart
//! owns the current content, so a hover-exit from one chart cannot hide or
//! alter a tooltip that the other chart is showing.

use std::time::{Duration, Instant};

use crate::animation::ease_cubic_in_out;
use crate::state::{ChartKind, Entry, DEFAULT_TOOLTIP_FADE};

/// Opacity of a fully faded-in tooltip
pub const TOOLTIP_OPACITY: f32 = 0.9;

/// Tooltip is drawn this far above the pointer
pub const TOOLTIP_OFFSET_Y: f32 = 28.0;

/// What a tooltip says
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipContent {
    pub label: String,
    pub count: f64,
}

impl TooltipContent {
    pub fn detail(&self) -> String {
        format!("Approximate Count: {}", self.count)
    }
}

/// Hover messages sent by the charts
#[derive(Clone, Debug, PartialEq)]
pub enum TooltipEvent {
    HoverEnter {
        chart: ChartKind,
        entry: Entry,
        pointer: (f32, f32),
    },
    HoverExit {
        chart: ChartKind,
    },
}

/// Observable tooltip state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TooltipState {
    pub visible: bool,
    /// Latched during the fade-out, replaced on the next hover
    pub content: Option<TooltipContent>,
    pub position: (f32, f32),
}

#[derive(Clone, Copy, Debug)]
struct Fade {
    from: f32,
    to: f32,
    start: Instant,
    duration: Duration,
}

impl Fade {
    fn sample(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return self.to;
        }
        let elapsed = now.saturating_duration_since(self.start).as_secs_f32();
        let t = ease_cubic_in_out((elapsed / self.duration.as_secs_f32()).min(1.0));
        self.from + (self.to - self.from) * t
    }

    fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.start) >= self.duration
    }
}

#[derive(Debug)]
pub struct TooltipController {
    state: TooltipState,
    owner: Option<ChartKind>,
    fade: Option<Fade>,
    fade_duration: Duration,
}

impl Default for TooltipController {
    fn default() -> Self {
        Self::new(DEFAULT_TOOLTIP_FADE)
    }
}

impl TooltipController {
    pub fn new(fade_duration: Duration) -> Self {
        Self {
            state: TooltipState::default(),
            owner: None,
            fade: None,
            fade_duration,
        }
    }

    pub fn state(&self) -> &TooltipState {
        &self.state
    }

    /// Chart whose element the tooltip currently describes
    pub fn owner(&self) -> Option<ChartKind> {
        self.owner
    }

    /// Apply a hover message; returns false if it was ignored
    pub fn handle(&mut self, event: TooltipEvent, now: Instant) -> bool {
        match event {
            TooltipEvent::HoverEnter {
                chart,
                entry,
                pointer,
            } => {
                self.owner = Some(chart);
                self.state.visible = true;
                self.state.content = Some(TooltipContent {
                    label: entry.label,
                    count: entry.count,
                });
                self.state.position = (pointer.0, pointer.1 - TOOLTIP_OFFSET_Y);
                self.fade_to(TOOLTIP_OPACITY, now);
                true
            }
            TooltipEvent::HoverExit { chart } => {
                if self.owner != Some(chart) || !self.state.visible {
                    return false;
                }
                self.state.visible = false;
                self.fade_to(0.0, now);
                true
            }
        }
    }

    pub fn opacity(&self, now: Instant) -> f32 {
        self.fade.map_or(0.0, |f| f.sample(now))
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.fade.is_some_and(|f| !f.is_finished(now))
    }

    fn fade_to(&mut self, target: f32, now: Instant) {
        let from = self.opacity(now);
        self.fade = Some(Fade {
            from,
            to: target,
            start: now,
            duration: self.fade_duration,
        });
    }
}
