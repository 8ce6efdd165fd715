//! Tests for the HTTP snapshot source
//!
//! Tests cover:
//! - Request timeouts against a server that never answers
//! - Connection failures

use std::net::TcpListener;
use std::time::{Duration, Instant};

use livecounts::source::{FetchError, HttpSource, SnapshotSource};

#[test]
fn test_silent_server_times_out_as_network_error() {
    // Accepts connections at the socket level but never writes a response
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server_url = format!("http://{}/", addr);
    let source = HttpSource::new(&server_url, "counts/slow", Duration::from_millis(200));

    let started = Instant::now();
    let result = source.fetch(10);

    assert!(matches!(result, Err(FetchError::Network(_))), "{:?}", result);
    assert!(started.elapsed() < Duration::from_secs(5));
    drop(listener);
}

#[test]
fn test_refused_connection_is_network_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let source = HttpSource::new(
        &format!("http://{}/", addr),
        "counts/gone",
        Duration::from_secs(2),
    );

    assert!(matches!(source.fetch(10), Err(FetchError::Network(_))));
}
