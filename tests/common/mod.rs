//! Common test utilities shared across all test modules
//!
//! This module provides snapshot fixtures and an in-memory snapshot source
//! so poll loop tests never touch the network.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use livecounts::poll::{FetchCompletion, FetchTicket};
use livecounts::source::{FetchError, SnapshotSource};
use livecounts::state::{Entry, Snapshot};

/// Build entries from `(label, count)` pairs
pub fn entries(pairs: &[(&str, f64)]) -> Vec<Entry> {
    pairs
        .iter()
        .map(|(label, count)| Entry::new(*label, *count))
        .collect()
}

/// Build a snapshot whose window size is the sum of its counts
pub fn snapshot(pairs: &[(&str, f64)]) -> Snapshot {
    let label_counts = entries(pairs);
    let window = label_counts.iter().map(|e| e.count).sum();
    Snapshot::new(window, label_counts)
}

/// A successful completion for `ticket`
pub fn completed(ticket: FetchTicket, pairs: &[(&str, f64)]) -> FetchCompletion {
    FetchCompletion {
        ticket,
        result: Ok(snapshot(pairs)),
    }
}

/// A failed completion for `ticket`
pub fn failed(ticket: FetchTicket, error: FetchError) -> FetchCompletion {
    FetchCompletion {
        ticket,
        result: Err(error),
    }
}

/// A moment comfortably after every default transition has finished
pub fn settled(now: Instant) -> Instant {
    now + Duration::from_secs(5)
}

/// Snapshot source answering from a queue of canned results.
///
/// Once the queue is empty every fetch returns the fallback snapshot. Each
/// requested `k` is recorded.
pub struct ScriptedSource {
    queue: Mutex<VecDeque<Result<Snapshot, FetchError>>>,
    fallback: Snapshot,
    requested: Mutex<Vec<u64>>,
}

impl ScriptedSource {
    pub fn new(fallback: Snapshot) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, result: Result<Snapshot, FetchError>) {
        self.queue.lock().unwrap().push_back(result);
    }

    pub fn requested(&self) -> Vec<u64> {
        self.requested.lock().unwrap().clone()
    }
}

impl SnapshotSource for ScriptedSource {
    fn fetch(&self, k: u64) -> Result<Snapshot, FetchError> {
        self.requested.lock().unwrap().push(k);
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

/// Snapshot source whose fetches block until [`GatedSource::open`] is called
pub struct GatedSource {
    open: Mutex<bool>,
    opened: Condvar,
}

impl GatedSource {
    pub fn new() -> Self {
        Self {
            open: Mutex::new(false),
            opened: Condvar::new(),
        }
    }

    /// Let every pending and future fetch return
    pub fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.opened.notify_all();
    }
}

impl SnapshotSource for GatedSource {
    fn fetch(&self, _k: u64) -> Result<Snapshot, FetchError> {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.opened.wait(open).unwrap();
        }
        Ok(Snapshot::default())
    }

    fn describe(&self) -> String {
        "gated".to_string()
    }
}
