//! Axis scales.
//!
//! Scales are pure values rebuilt from the current entries and viewport on
//! every render pass; nothing here survives between frames.

/// A linear mapping from a continuous domain to a pixel range
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f32, f32),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f32, f32)) -> Self {
        Self { domain, range }
    }

    /// Maps a domain value into range space.
    ///
    /// A zero-width domain (e.g. every count is 0, or there are no entries)
    /// maps everything to the start of the range.
    pub fn map(&self, value: f64) -> f32 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let denom = d1 - d0;
        if denom == 0.0 || !denom.is_finite() {
            return r0;
        }
        let t = ((value - d0) / denom) as f32;
        r0 + t * (r1 - r0)
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f32, f32) {
        self.range
    }

    /// Round tick values inside the domain, about `count` of them
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        nice_ticks(d0.min(d1), d0.max(d1), count)
    }
}

/// Tick values at multiples of 1, 2 or 5 times a power of ten, covering
/// `[min, max]` without leaving it.
fn nice_ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    if count == 0 || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    if min == max {
        return vec![min];
    }
    let step = tick_step(min, max, count);
    if step <= 0.0 || !step.is_finite() {
        return Vec::new();
    }

    let start = (min / step).ceil() as i64;
    let stop = (max / step).floor() as i64;
    (start..=stop).map(|i| i as f64 * step).collect()
}

fn tick_step(min: f64, max: f64, count: usize) -> f64 {
    let raw = (max - min) / count as f64;
    let power = raw.log10().floor();
    let base = 10_f64.powf(power);
    let error = raw / base;
    let factor = if error >= 50_f64.sqrt() {
        10.0
    } else if error >= 10_f64.sqrt() {
        5.0
    } else if error >= 2_f64.sqrt() {
        2.0
    } else {
        1.0
    };
    base * factor
}

/// Maps an ordered set of labels onto equal-width contiguous slots
#[derive(Clone, Debug, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    range: (f32, f32),
}

impl BandScale {
    pub fn new(domain: Vec<String>, range: (f32, f32)) -> Self {
        Self { domain, range }
    }

    /// Width of one slot, 0 when the domain is empty
    pub fn bandwidth(&self) -> f32 {
        if self.domain.is_empty() {
            return 0.0;
        }
        (self.range.1 - self.range.0).abs() / self.domain.len() as f32
    }

    /// Left edge of the slot holding `label`
    pub fn position(&self, label: &str) -> Option<f32> {
        self.index_of(label).map(|i| self.position_at(i))
    }

    /// Left edge of the slot at `index`
    pub fn position_at(&self, index: usize) -> f32 {
        self.range.0.min(self.range.1) + self.bandwidth() * index as f32
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.domain.iter().position(|l| l == label)
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn range(&self) -> (f32, f32) {
        self.range
    }
}
