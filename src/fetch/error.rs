//! Retrieval error type, classified from curl errors and HTTP status.

use thiserror::Error;

/// Which kind of connection failure curl reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectFailure {
    /// Host name could not be resolved.
    DnsLookup,
    /// Host resolved but refused or never accepted the connection.
    Refused,
}

/// Error returned by a single retrieval attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("connection to {url} failed: {source}")]
    ConnectionFailed {
        url: String,
        kind: ConnectFailure,
        #[source]
        source: curl::Error,
    },
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        url: String,
        timeout_secs: u64,
        #[source]
        source: curl::Error,
    },
    /// Final response had a non-2xx status.
    #[error("GET {url} returned HTTP {status}")]
    UpstreamStatus { url: String, status: u32 },
    /// Body grew past the configured ceiling; the transfer was aborted.
    #[error("response body from {url} exceeds {limit} bytes")]
    BodyTooLarge { url: String, limit: u64 },
    #[error("unsupported protocol in {url}")]
    UnsupportedScheme { url: String },
    /// Any other curl failure (TLS, protocol, setup).
    #[error("transfer failed: {0}")]
    Transport(#[source] curl::Error),
    /// The blocking transfer task panicked or was cancelled.
    #[error("fetch task failed: {0}")]
    Task(String),
}

impl FetchError {
    /// Builds the right variant for a curl error raised during `perform`.
    pub(crate) fn from_curl(url: &str, timeout_secs: u64, e: curl::Error) -> Self {
        if e.is_operation_timedout() {
            return FetchError::Timeout {
                url: url.to_string(),
                timeout_secs,
                source: e,
            };
        }
        let kind = if e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() {
            Some(ConnectFailure::DnsLookup)
        } else if e.is_couldnt_connect() {
            Some(ConnectFailure::Refused)
        } else {
            None
        };
        match kind {
            Some(kind) => FetchError::ConnectionFailed {
                url: url.to_string(),
                kind,
                source: e,
            },
            None => FetchError::Transport(e),
        }
    }

    /// The remote HTTP status, when the failure came from a response.
    pub fn http_status(&self) -> Option<u32> {
        match self {
            FetchError::UpstreamStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        FetchError::Transport(e)
    }
}
