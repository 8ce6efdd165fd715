//! Tests for the per-chart poll loop
//!
//! Tests cover:
//! - Last-issued-wins handling of out-of-order completions
//! - Failure recovery keeping the last good snapshot
//! - Resize without refetching
//! - Parameter changes triggering an immediate fetch
//! - Isolation between the two charts
//! - Bounded number of outstanding fetches

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use livecounts::poll::{PollConfig, PollLoop, PollOutcome, MAX_IN_FLIGHT};
use livecounts::source::FetchError;
use livecounts::state::{ChartKind, Entry, Snapshot};

use crate::common::{completed, failed, settled, snapshot, GatedSource, ScriptedSource};

const WIDTH: f32 = 815.0;
const WAIT: Duration = Duration::from_secs(5);

fn poll_loop(kind: ChartKind, source: Arc<ScriptedSource>) -> PollLoop {
    let config = PollConfig {
        initial_k: 100,
        ..PollConfig::default()
    };
    PollLoop::new(kind, source, &config, WIDTH)
}

fn idle_source() -> Arc<ScriptedSource> {
    Arc::new(ScriptedSource::new(Snapshot::default()))
}

// ============================================
// Sequencing Tests
// ============================================

#[test]
fn test_out_of_order_completion_is_discarded() {
    let now = Instant::now();
    let mut poll = poll_loop(ChartKind::Frequency, idle_source());

    let older = poll.begin_fetch();
    let newer = poll.begin_fetch();
    assert!(newer.seq > older.seq);

    let outcome = poll.apply_completion(completed(newer, &[("new", 2.0)]), now);
    assert!(matches!(outcome, PollOutcome::Applied(_)));

    let outcome = poll.apply_completion(completed(older, &[("old", 1.0)]), now);
    assert!(matches!(outcome, PollOutcome::Stale(ticket) if ticket == older));

    assert_eq!(
        poll.state().latest_snapshot.label_counts,
        vec![Entry::new("new", 2.0)]
    );
    assert_eq!(poll.reconciler().labels(), ["new"]);
}

#[test]
fn test_in_order_completions_are_all_applied() {
    let now = Instant::now();
    let mut poll = poll_loop(ChartKind::Frequency, idle_source());

    let first = poll.begin_fetch();
    let second = poll.begin_fetch();
    assert!(matches!(
        poll.apply_completion(completed(first, &[("a", 1.0)]), now),
        PollOutcome::Applied(_)
    ));
    assert!(matches!(
        poll.apply_completion(completed(second, &[("b", 1.0)]), now),
        PollOutcome::Applied(_)
    ));
    assert_eq!(poll.reconciler().labels(), ["b"]);
}

#[test]
fn test_failed_newer_fetch_does_not_block_older_result() {
    let now = Instant::now();
    let mut poll = poll_loop(ChartKind::Frequency, idle_source());

    let older = poll.begin_fetch();
    let newer = poll.begin_fetch();
    poll.apply_completion(failed(newer, FetchError::Status(503)), now);

    let outcome = poll.apply_completion(completed(older, &[("a", 1.0)]), now);
    assert!(matches!(outcome, PollOutcome::Applied(_)));
    assert!(poll.last_error().is_none());
}

#[test]
fn test_ticket_carries_current_parameter() {
    let mut poll = poll_loop(ChartKind::Bucket, idle_source());
    assert_eq!(poll.begin_fetch().k, 100);
    assert_eq!(poll.state().parameter_k, 100);
}

// ============================================
// Failure Handling Tests
// ============================================

#[test]
fn test_failure_keeps_last_good_snapshot() {
    let now = Instant::now();
    let mut poll = poll_loop(ChartKind::Frequency, idle_source());

    let good = poll.begin_fetch();
    poll.apply_completion(completed(good, &[("a", 3.0), ("b", 1.0)]), now);
    let before = poll.state().latest_snapshot.clone();

    let bad = poll.begin_fetch();
    let error = FetchError::Network("connection refused".to_string());
    let outcome = poll.apply_completion(failed(bad, error.clone()), now);

    assert!(matches!(outcome, PollOutcome::Failed(ref e) if *e == error));
    assert_eq!(poll.state().latest_snapshot, before);
    assert_eq!(poll.reconciler().labels(), ["a", "b"]);
    assert_eq!(poll.last_error(), Some(&error));

    let recovered = poll.begin_fetch();
    poll.apply_completion(completed(recovered, &[("c", 1.0)]), now);
    assert!(poll.last_error().is_none());
    assert_eq!(poll.reconciler().labels(), ["c"]);
}

#[test]
fn test_duplicate_labels_are_malformed_payload() {
    let now = Instant::now();
    let mut poll = poll_loop(ChartKind::Frequency, idle_source());

    let good = poll.begin_fetch();
    poll.apply_completion(completed(good, &[("a", 3.0)]), now);

    let bad = poll.begin_fetch();
    let outcome = poll.apply_completion(completed(bad, &[("x", 1.0), ("x", 2.0)]), now);

    assert!(matches!(outcome, PollOutcome::Failed(FetchError::Malformed(_))));
    assert_eq!(poll.reconciler().labels(), ["a"]);
}

#[test]
fn test_charts_fail_independently() {
    let now = Instant::now();
    let mut frequency = poll_loop(ChartKind::Frequency, idle_source());
    let mut bucket = poll_loop(ChartKind::Bucket, idle_source());

    let ticket = frequency.begin_fetch();
    frequency.apply_completion(failed(ticket, FetchError::Status(500)), now);

    let ticket = bucket.begin_fetch();
    let outcome = bucket.apply_completion(completed(ticket, &[("1 BTC", 4.0)]), now);

    assert!(matches!(outcome, PollOutcome::Applied(_)));
    assert!(frequency.last_error().is_some());
    assert!(bucket.last_error().is_none());
    assert_eq!(bucket.reconciler().labels(), ["1 BTC"]);
}

// ============================================
// Resize Tests
// ============================================

#[test]
fn test_resize_relayouts_without_fetching() {
    let now = Instant::now();
    let source = idle_source();
    let mut poll = poll_loop(ChartKind::Frequency, Arc::clone(&source));

    let ticket = poll.begin_fetch();
    poll.apply_completion(completed(ticket, &[("a", 10.0)]), now);

    let report = poll.on_resize(415.0, now).unwrap();
    assert_eq!(report.entered().count(), 0);
    assert_eq!(poll.state().viewport_width, 415.0);
    assert_eq!(poll.reconciler().layout().plot_width, 400.0);
    assert!(source.requested().is_empty());
}

// ============================================
// Background Fetch Tests
// ============================================

#[test]
fn test_set_parameter_fetches_with_new_k() {
    let now = Instant::now();
    let source = Arc::new(ScriptedSource::new(snapshot(&[("rust", 7.0)])));
    let mut poll = poll_loop(ChartKind::Frequency, Arc::clone(&source));

    let ticket = poll.set_parameter(42);
    assert_eq!(ticket.k, 42);
    assert_eq!(poll.state().parameter_k, 42);

    let outcome = poll.wait_for_completion(WAIT, now);
    assert!(matches!(outcome, Some(PollOutcome::Applied(_))));
    assert_eq!(source.requested(), vec![42]);
    assert_eq!(poll.reconciler().labels(), ["rust"]);
}

#[test]
fn test_start_fetches_immediately_and_schedules_next_poll() {
    let now = Instant::now();
    let source = Arc::new(ScriptedSource::new(snapshot(&[("a", 1.0)])));
    let mut poll = poll_loop(ChartKind::Frequency, Arc::clone(&source));
    assert!(!poll.timer().is_running());

    poll.start(now);
    assert!(poll.timer().is_running());
    assert_eq!(poll.timer().next_due(), Some(now + poll.timer().interval()));
    assert!(poll.wait_for_completion(WAIT, now).is_some());

    // Not due yet, then due
    assert!(poll.tick(now).is_none());
    assert!(poll.tick(now + poll.timer().interval()).is_some());
    assert!(poll.wait_for_completion(WAIT, now).is_some());
    assert_eq!(source.requested(), vec![100, 100]);

    poll.stop();
    assert!(poll.tick(now + Duration::from_secs(60)).is_none());
}

#[test]
fn test_background_failure_is_reported() {
    let now = Instant::now();
    let source = idle_source();
    source.push(Err(FetchError::Status(404)));
    let mut poll = poll_loop(ChartKind::Bucket, Arc::clone(&source));

    poll.request_fetch();
    let outcome = poll.wait_for_completion(WAIT, now);
    assert!(matches!(outcome, Some(PollOutcome::Failed(FetchError::Status(404)))));
}

#[test]
fn test_waker_runs_after_completion() {
    let now = Instant::now();
    let counter = Arc::new(AtomicUsize::new(0));
    let mut poll = poll_loop(ChartKind::Frequency, idle_source());

    let seen = Arc::clone(&counter);
    poll.set_waker(Arc::new(move || {
        seen.fetch_add(1, Ordering::SeqCst);
    }));
    poll.request_fetch();
    assert!(poll.wait_for_completion(WAIT, now).is_some());

    // The waker runs right after the send; give the fetch thread a moment
    let deadline = Instant::now() + WAIT;
    while counter.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_hanging_endpoint_caps_outstanding_fetches() {
    let now = Instant::now();
    let source = Arc::new(GatedSource::new());
    let config = PollConfig {
        initial_k: 100,
        ..PollConfig::default()
    };
    let shared: Arc<GatedSource> = Arc::clone(&source);
    let mut poll = PollLoop::new(ChartKind::Bucket, shared, &config, WIDTH);
    let interval = poll.timer().interval();

    poll.start(now);
    let mut issued = 1;
    for i in 1..=10u32 {
        if poll.tick(now + interval * i).is_some() {
            issued += 1;
        }
    }
    assert_eq!(issued, MAX_IN_FLIGHT);
    assert_eq!(poll.in_flight(), MAX_IN_FLIGHT);

    source.open();
    for _ in 0..MAX_IN_FLIGHT {
        assert!(poll.wait_for_completion(WAIT, now).is_some());
    }
    assert_eq!(poll.in_flight(), 0);
    assert!(poll.tick(now + interval * 11).is_some());
    assert!(poll.wait_for_completion(WAIT, now).is_some());
}

#[test]
fn test_each_frame_drops_finished_exits() {
    let now = Instant::now();
    let mut poll = poll_loop(ChartKind::Frequency, idle_source());

    let first = poll.begin_fetch();
    poll.apply_completion(completed(first, &[("a", 3.0), ("b", 1.0)]), now);
    let second = poll.begin_fetch();
    poll.apply_completion(completed(second, &[("a", 3.0)]), now);
    assert_eq!(poll.reconciler().exiting_count(), 1);

    // Nothing arrives, but the frame still clears the finished fade
    assert!(poll.poll_completions(settled(now)).is_empty());
    assert_eq!(poll.reconciler().exiting_count(), 0);
}
