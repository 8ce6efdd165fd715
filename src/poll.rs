//! Poll-and-render loop for one chart.
//!
//! Each chart owns a [`PollLoop`]: its [`ChartState`], its [`Reconciler`], its
//! own [`PollTimer`] and its own completion channel. Nothing is shared between
//! the two charts, so a failing endpoint only ever affects its own chart.
//!
//! Fetches run on background threads and report back over an mpsc channel.
//! The UI thread drains completions once per frame. Every fetch carries a
//! sequence number; a completion older than the newest snapshot already
//! applied is discarded, so the most recently issued request always wins.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::reconciler::{ReconcileReport, Reconciler};
use crate::source::{FetchError, SnapshotSource};
use crate::state::{ChartKind, ChartState, Snapshot, SnapshotError, DEFAULT_POLL_INTERVAL};

/// Timer ticks are skipped while this many fetches are still outstanding
pub const MAX_IN_FLIGHT: usize = 4;

/// Called from fetch threads when a completion is ready (e.g. to wake the UI)
pub type Waker = Arc<dyn Fn() + Send + Sync>;

// ============================================================================
// Timer
// ============================================================================

/// A cancellable, restartable fixed-interval schedule
#[derive(Clone, Debug)]
pub struct PollTimer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl PollTimer {
    /// A stopped timer
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start (or restart) the schedule; first firing is one interval from `now`
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// True if the timer fired at or before `now`.
    ///
    /// Missed firings collapse into one; the next firing is scheduled one
    /// interval after `now`.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if due <= now => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

// ============================================================================
// Fetch bookkeeping
// ============================================================================

/// Identifies one issued fetch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub k: u64,
}

/// A finished fetch, delivered back to the UI thread
#[derive(Debug)]
pub struct FetchCompletion {
    pub ticket: FetchTicket,
    pub result: Result<Snapshot, FetchError>,
}

/// What happened to a completion
#[derive(Debug)]
pub enum PollOutcome {
    /// Snapshot replaced the chart's data and was reconciled
    Applied(ReconcileReport),
    /// A newer snapshot was already applied; completion discarded
    Stale(FetchTicket),
    /// Fetch failed; chart keeps its last good snapshot
    Failed(FetchError),
}

/// Tunables of one poll loop
#[derive(Clone, Debug)]
pub struct PollConfig {
    pub initial_k: u64,
    pub interval: Duration,
    pub transition: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_k: 1000,
            interval: DEFAULT_POLL_INTERVAL,
            transition: crate::state::DEFAULT_TRANSITION,
        }
    }
}

// ============================================================================
// Poll loop
// ============================================================================

pub struct PollLoop {
    kind: ChartKind,
    state: ChartState,
    reconciler: Reconciler,
    source: Arc<dyn SnapshotSource>,
    timer: PollTimer,
    next_seq: u64,
    newest_applied: Option<u64>,
    last_error: Option<FetchError>,
    /// Fetch threads started and not yet drained from the channel
    in_flight: usize,
    sender: Sender<FetchCompletion>,
    receiver: Receiver<FetchCompletion>,
    waker: Option<Waker>,
}

impl PollLoop {
    pub fn new(
        kind: ChartKind,
        source: Arc<dyn SnapshotSource>,
        config: &PollConfig,
        viewport_width: f32,
    ) -> Self {
        let (sender, receiver) = channel();
        Self {
            kind,
            state: ChartState::new(config.initial_k, viewport_width),
            reconciler: Reconciler::new(kind).with_transition(config.transition),
            source,
            timer: PollTimer::new(config.interval),
            next_seq: 0,
            newest_applied: None,
            last_error: None,
            in_flight: 0,
            sender,
            receiver,
            waker: None,
        }
    }

    /// Install a callback run by fetch threads after they deliver a result
    pub fn set_waker(&mut self, waker: Waker) {
        self.waker = Some(waker);
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn state(&self) -> &ChartState {
        &self.state
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn timer(&self) -> &PollTimer {
        &self.timer
    }

    /// Fetches issued on background threads whose result is not yet drained
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Most recent fetch failure, cleared by the next applied snapshot
    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    /// Start polling: fetch immediately, then every interval
    pub fn start(&mut self, now: Instant) -> FetchTicket {
        self.timer.start(now);
        self.request_fetch()
    }

    /// Stop scheduled polling; in-flight fetches still complete
    pub fn stop(&mut self) {
        self.timer.stop();
    }

    /// Change `k` and fetch right away, independent of the timer
    pub fn set_parameter(&mut self, k: u64) -> FetchTicket {
        self.state.parameter_k = k;
        self.request_fetch()
    }

    /// Fetch with the current `k` if the timer is due.
    ///
    /// A due tick is dropped while [`MAX_IN_FLIGHT`] fetches are outstanding,
    /// so a hanging endpoint cannot pile up threads.
    pub fn tick(&mut self, now: Instant) -> Option<FetchTicket> {
        if !self.timer.fire_if_due(now) {
            return None;
        }
        if self.in_flight >= MAX_IN_FLIGHT {
            tracing::debug!(
                "Skipping {} poll, {} fetches still in flight",
                self.kind,
                self.in_flight
            );
            return None;
        }
        Some(self.request_fetch())
    }

    /// Re-layout the existing snapshot for a new viewport width. No fetch.
    pub fn on_resize(
        &mut self,
        viewport_width: f32,
        now: Instant,
    ) -> Result<ReconcileReport, SnapshotError> {
        self.state.viewport_width = viewport_width;
        self.render(now)
    }

    /// Reconcile the current snapshot against the chart's elements
    pub fn render(&mut self, now: Instant) -> Result<ReconcileReport, SnapshotError> {
        self.reconciler
            .reconcile(&self.state.latest_snapshot, self.state.viewport_width, now)
    }

    /// Issue a fetch on a background thread
    pub fn request_fetch(&mut self) -> FetchTicket {
        let ticket = self.begin_fetch();
        let source = Arc::clone(&self.source);
        let sender = self.sender.clone();
        let waker = self.waker.clone();

        tracing::debug!(
            "Fetching {} chart from {} (k={}, seq={})",
            self.kind,
            source.describe(),
            ticket.k,
            ticket.seq
        );

        self.in_flight += 1;
        let spawned = thread::Builder::new()
            .name(format!("fetch-{}", self.kind))
            .spawn(move || {
                let result = source.fetch(ticket.k);
                // Receiver is gone only when the loop itself was dropped
                let _ = sender.send(FetchCompletion { ticket, result });
                if let Some(waker) = waker {
                    waker();
                }
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to spawn fetch thread: {}", e);
            let _ = self.sender.send(FetchCompletion {
                ticket,
                result: Err(FetchError::Network(format!("could not start fetch: {}", e))),
            });
        }

        ticket
    }

    /// Allocate the next sequence number for a fetch with the current `k`
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.next_seq += 1;
        FetchTicket {
            seq: self.next_seq,
            k: self.state.parameter_k,
        }
    }

    /// Apply every completion that has arrived so far and drop finished exits
    pub fn poll_completions(&mut self, now: Instant) -> Vec<PollOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(completion) = self.receiver.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            outcomes.push(self.apply_completion(completion, now));
        }
        self.reconciler.prune(now);
        outcomes
    }

    /// Block up to `timeout` for one completion and apply it
    pub fn wait_for_completion(&mut self, timeout: Duration, now: Instant) -> Option<PollOutcome> {
        let completion = self.receiver.recv_timeout(timeout).ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(self.apply_completion(completion, now))
    }

    /// Apply one completion, honouring last-issued-wins ordering
    pub fn apply_completion(&mut self, completion: FetchCompletion, now: Instant) -> PollOutcome {
        let FetchCompletion { ticket, result } = completion;

        if self.newest_applied.is_some_and(|newest| ticket.seq <= newest) {
            tracing::debug!(
                "Discarding stale {} snapshot (seq={}, newest={:?})",
                self.kind,
                ticket.seq,
                self.newest_applied
            );
            return PollOutcome::Stale(ticket);
        }

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => return self.record_failure(e),
        };

        // Validate before replacing so a bad payload never evicts good data
        if let Err(e) = snapshot.validate() {
            return self.record_failure(FetchError::Malformed(e.to_string()));
        }

        self.state.latest_snapshot = snapshot;
        self.newest_applied = Some(ticket.seq);
        self.last_error = None;

        match self.render(now) {
            Ok(report) => PollOutcome::Applied(report),
            Err(e) => self.record_failure(FetchError::Malformed(e.to_string())),
        }
    }

    /// True while bars are still moving
    pub fn is_animating(&self, now: Instant) -> bool {
        self.reconciler.is_animating(now)
    }

    fn record_failure(&mut self, error: FetchError) -> PollOutcome {
        tracing::warn!("Fetch for {} chart failed: {}", self.kind, error);
        self.last_error = Some(error.clone());
        PollOutcome::Failed(error)
    }
}
