//! Counts endpoint client.
//!
//! A chart's data comes from `GET <server>/<endpoint>?k=<integer>`, answered
//! with a JSON [`Snapshot`]. Fetches are blocking; the poll loop runs them on
//! background threads.

use std::time::Duration;
use thiserror::Error;

use crate::state::Snapshot;

const USER_AGENT: &str = concat!("livecounts/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Error Types
// ============================================================================

/// Why a fetch produced no snapshot. Always recoverable.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    /// Connection, DNS or transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a non-2xx status
    #[error("Server returned status {0}")]
    Status(u16),

    /// Body was not a valid snapshot
    #[error("Malformed payload: {0}")]
    Malformed(String),
}

// ============================================================================
// Sources
// ============================================================================

/// Anything that can produce a snapshot for a given `k`
pub trait SnapshotSource: Send + Sync {
    fn fetch(&self, k: u64) -> Result<Snapshot, FetchError>;

    /// Human-readable origin, used in logs
    fn describe(&self) -> String;
}

/// Snapshot source backed by an HTTP endpoint
#[derive(Clone, Debug)]
pub struct HttpSource {
    url: String,
    agent: ureq::Agent,
}

impl HttpSource {
    /// Build a source for `endpoint` relative to `server_url`.
    ///
    /// A request that has not completed within `timeout` (connect, send and
    /// read combined) fails with [`FetchError::Network`].
    pub fn new(server_url: &str, endpoint: &str, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            url: join_url(server_url, endpoint),
            agent,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SnapshotSource for HttpSource {
    fn fetch(&self, k: u64) -> Result<Snapshot, FetchError> {
        let mut response = match self
            .agent
            .get(&self.url)
            .query("k", k.to_string())
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json")
            .call()
        {
            Ok(resp) => resp,
            Err(ureq::Error::StatusCode(status)) => return Err(FetchError::Status(status)),
            Err(ureq::Error::Timeout(which)) => {
                return Err(FetchError::Network(format!("request timed out ({})", which)))
            }
            Err(e) => return Err(FetchError::Network(e.to_string())),
        };

        let snapshot: Snapshot = response.body_mut().read_json().map_err(|e| match e {
            ureq::Error::Timeout(which) => {
                FetchError::Network(format!("request timed out ({})", which))
            }
            other => FetchError::Malformed(other.to_string()),
        })?;

        snapshot
            .validate()
            .map_err(|e| FetchError::Malformed(e.to_string()))?;

        Ok(snapshot)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Join a base URL and a relative endpoint with exactly one slash between them
pub fn join_url(server_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        server_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}
