//! Time-based interpolation of bar appearance.
//!
//! Transitions are fire-and-forget: starting a new one never waits for the
//! previous one, it simply begins from wherever the old one currently is.

use std::time::{Duration, Instant};

/// Rectangle of a bar, relative to the chart's bar group origin
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BarGeometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BarGeometry {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    fn lerp(&self, to: &BarGeometry, t: f32) -> BarGeometry {
        BarGeometry {
            x: lerp(self.x, to.x, t),
            y: lerp(self.y, to.y, t),
            width: lerp(self.width, to.width, t),
            height: lerp(self.height, to.height, t),
        }
    }
}

/// Everything about a bar that can be animated
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Appearance {
    pub geometry: BarGeometry,
    pub opacity: f32,
}

impl Appearance {
    pub fn new(geometry: BarGeometry, opacity: f32) -> Self {
        Self { geometry, opacity }
    }

    pub fn opaque(geometry: BarGeometry) -> Self {
        Self::new(geometry, 1.0)
    }
}

/// Cubic in-out easing on `[0, 1]`
pub fn ease_cubic_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// An eased transition between two appearances
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    from: Appearance,
    to: Appearance,
    start: Instant,
    duration: Duration,
}

impl Tween {
    pub fn new(from: Appearance, to: Appearance, start: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            start,
            duration,
        }
    }

    /// A tween that is already at rest at `at`
    pub fn settled(at: Appearance, now: Instant) -> Self {
        Self::new(at, at, now, Duration::ZERO)
    }

    /// Progress in `[0, 1]` before easing
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn sample(&self, now: Instant) -> Appearance {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return self.to;
        }
        let t = ease_cubic_in_out(progress);
        Appearance {
            geometry: self.from.geometry.lerp(&self.to.geometry, t),
            opacity: lerp(self.from.opacity, self.to.opacity, t),
        }
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    pub fn target(&self) -> Appearance {
        self.to
    }

    /// Start a new tween toward `to` from wherever this one is at `now`
    pub fn retarget(&self, to: Appearance, now: Instant, duration: Duration) -> Tween {
        Tween::new(self.sample(now), to, now, duration)
    }
}
