//! Maps every unrecovered failure to an outward status code and error body.
//!
//! This is the only place that decides what a caller sees when the pipeline
//! stops early. The full cause is logged before the response is built; the
//! caller only gets the top-level message in `details`.

use crate::fetch::{ConnectFailure, FetchError};
use crate::request::RequestError;
use serde::Serialize;
use std::error::Error as StdError;

pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const INVALID_JSON: &str = "Invalid JSON in request body";
pub const URL_REQUIRED: &str = "Image URL is required";
pub const INVALID_URL: &str = "Invalid URL format";
pub const CONNECT_FAILED: &str =
    "Could not connect to the URL. Please check if the URL is accessible.";
pub const TIMED_OUT: &str = "Request timed out. The server may be slow or unreachable.";
pub const NOT_FOUND: &str = "URL not found (404). Please check the URL.";
pub const FORBIDDEN: &str = "Access forbidden (403). The URL may have access restrictions.";
pub const GENERIC_FAILURE: &str = "Failed to test URL";

/// Anything that ends a request before a result can be composed.
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    #[error("method {0} not allowed")]
    MethodNotAllowed(String),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// JSON body of a non-200 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResult {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u32>,
}

impl ErrorResult {
    fn message(error: &str) -> Self {
        Self {
            error: error.to_string(),
            details: None,
            code: None,
            http_status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub status: u16,
    pub body: ErrorResult,
}

/// Short machine-readable code for a retrieval failure.
pub fn error_code(e: &FetchError) -> &'static str {
    match e {
        FetchError::ConnectionFailed {
            kind: ConnectFailure::DnsLookup,
            ..
        } => "ENOTFOUND",
        FetchError::ConnectionFailed {
            kind: ConnectFailure::Refused,
            ..
        } => "ECONNREFUSED",
        FetchError::Timeout { .. } => "ETIMEDOUT",
        FetchError::UpstreamStatus { status, .. } => match *status {
            400..=499 => "ERR_BAD_REQUEST",
            500..=599 => "ERR_BAD_RESPONSE",
            _ => "UNKNOWN",
        },
        FetchError::UnsupportedScheme { .. } => "ERR_BAD_REQUEST",
        FetchError::BodyTooLarge { .. } | FetchError::Transport(_) | FetchError::Task(_) => {
            "UNKNOWN"
        }
    }
}

fn classify_fetch(e: &FetchError) -> Classified {
    let (status, error) = match e {
        FetchError::ConnectionFailed { .. } => (400, CONNECT_FAILED),
        FetchError::Timeout { .. } => (408, TIMED_OUT),
        FetchError::UpstreamStatus { status: 404, .. } => (404, NOT_FOUND),
        FetchError::UpstreamStatus { status: 403, .. } => (403, FORBIDDEN),
        _ => (500, GENERIC_FAILURE),
    };
    Classified {
        status,
        body: ErrorResult {
            error: error.to_string(),
            details: Some(e.to_string()),
            code: Some(error_code(e).to_string()),
            http_status: e.http_status(),
        },
    }
}

/// Renders an error and all of its sources, outermost first.
pub fn error_chain(e: &dyn StdError) -> String {
    let mut out = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

/// Logs the failure and returns the status and body to send.
pub fn classify(failure: &Failure) -> Classified {
    let classified = match failure {
        Failure::MethodNotAllowed(_) => Classified {
            status: 405,
            body: ErrorResult::message(METHOD_NOT_ALLOWED),
        },
        Failure::Request(RequestError::MalformedPayload(e)) => Classified {
            status: 400,
            body: ErrorResult {
                details: Some(e.to_string()),
                ..ErrorResult::message(INVALID_JSON)
            },
        },
        Failure::Request(RequestError::MissingField) => Classified {
            status: 400,
            body: ErrorResult::message(URL_REQUIRED),
        },
        Failure::Request(RequestError::InvalidUrl { .. }) => Classified {
            status: 400,
            body: ErrorResult::message(INVALID_URL),
        },
        Failure::Fetch(e) => classify_fetch(e),
    };

    tracing::error!(
        status = classified.status,
        cause = %error_chain(failure),
        debug = ?failure,
        "{}",
        classified.body.error
    );
    classified
}
