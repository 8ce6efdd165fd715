//! Ordering policies for chart entries.
//!
//! Both charts sort their entries before every render pass. The same order is
//! used to lay bars out and to re-sequence bars that are already on screen.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;
use thiserror::Error;

use crate::state::{ChartKind, Entry};

/// Leading decimal number of a bucket label's first token, e.g. `"2.5"` in `"2.5 BTC"`
static BUCKET_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("Failed to compile regex")
});

/// A bucket label without a numeric prefix
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("bucket label '{label}' has no leading numeric value")]
pub struct BucketLabelError {
    pub label: String,
}

/// How a chart orders its entries
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderingPolicy {
    /// Count descending, then label descending
    Frequency,
    /// Numeric label prefix ascending
    Bucket,
}

impl From<ChartKind> for OrderingPolicy {
    fn from(kind: ChartKind) -> Self {
        match kind {
            ChartKind::Frequency => OrderingPolicy::Frequency,
            ChartKind::Bucket => OrderingPolicy::Bucket,
        }
    }
}

impl OrderingPolicy {
    /// Sort `entries` in place.
    ///
    /// Returns every bucket label that could not be parsed. Those entries are
    /// kept, placed after all valid buckets in ascending label order, and
    /// logged.
    pub fn sort(self, entries: &mut [Entry]) -> Vec<BucketLabelError> {
        match self {
            OrderingPolicy::Frequency => {
                entries.sort_by(compare_frequency);
                Vec::new()
            }
            OrderingPolicy::Bucket => sort_buckets(entries),
        }
    }
}

/// Frequency order: count descending, ties broken by label descending
pub fn compare_frequency(a: &Entry, b: &Entry) -> Ordering {
    b.count
        .total_cmp(&a.count)
        .then_with(|| compare_labels(&b.label, &a.label))
}

/// Label order by UTF-16 code units, matching how browsers compare strings.
///
/// Differs from `str::cmp` only when a supplementary-plane character meets
/// one in U+E000..=U+FFFF.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

/// Parse the numeric value a bucket label starts with.
///
/// Only the first space-separated token is considered, and only its leading
/// numeric prefix, so `"10 USD"` and `"10USD"` both give `10`.
pub fn bucket_value(label: &str) -> Result<f64, BucketLabelError> {
    let token = label.split(' ').next().unwrap_or_default();
    BUCKET_PREFIX
        .find(token)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .ok_or_else(|| BucketLabelError {
            label: label.to_string(),
        })
}

/// Bucket order between two labels, failing on the first unparsable one
pub fn compare_bucket(a: &Entry, b: &Entry) -> Result<Ordering, BucketLabelError> {
    let va = bucket_value(&a.label)?;
    let vb = bucket_value(&b.label)?;
    Ok(va.total_cmp(&vb))
}

fn sort_buckets(entries: &mut [Entry]) -> Vec<BucketLabelError> {
    let mut errors = Vec::new();
    let mut keyed: Vec<(Option<f64>, Entry)> = entries
        .iter()
        .map(|entry| match bucket_value(&entry.label) {
            Ok(v) => (Some(v), entry.clone()),
            Err(e) => {
                tracing::warn!("Malformed bucket label: {}", e.label);
                errors.push(e);
                (None, entry.clone())
            }
        })
        .collect();

    // Stable sort: equal buckets keep their input order
    keyed.sort_by(|(va, a), (vb, b)| match (va, vb) {
        (Some(x), Some(y)) => x.total_cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_labels(&a.label, &b.label),
    });

    for (slot, (_, entry)) in entries.iter_mut().zip(keyed) {
        *slot = entry;
    }
    errors
}
