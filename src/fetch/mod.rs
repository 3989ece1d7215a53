//! HTTP retrieval of the resource under test.
//!
//! Uses the curl crate (libcurl) for a single full-body GET with a hard
//! deadline. Response headers are captured for the result and for the
//! `Content-Length` cross-check; no retry is ever attempted.

mod error;
mod parse;

pub use error::{ConnectFailure, FetchError};

use crate::config::VerifierConfig;
use std::collections::BTreeMap;
use std::time::Duration;

/// Floor applied to both deadlines; libcurl treats zero as no limit.
const MIN_DEADLINE: Duration = Duration::from_secs(1);

/// Per-call retrieval settings.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Deadline for the whole operation.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    pub max_redirects: u32,
    /// The transfer is aborted once the body grows past this.
    pub max_body_bytes: u64,
}

impl From<&VerifierConfig> for FetchOptions {
    fn from(cfg: &VerifierConfig) -> Self {
        Self {
            timeout: cfg.timeout(),
            connect_timeout: cfg.connect_timeout(),
            user_agent: cfg.user_agent.clone(),
            max_redirects: cfg.max_redirects,
            max_body_bytes: cfg.max_body_bytes,
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from(&VerifierConfig::default())
    }
}

/// Everything kept from one successful GET.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub status_code: u32,
    /// Final response headers, lowercased names.
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
    /// `Content-Length` header if parseable, otherwise the body length.
    pub content_length: Option<u64>,
}

impl FetchOutcome {
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }
}

/// Performs a GET and returns status, headers and body bytes.
///
/// Follows redirects up to `max_redirects`. Any final status outside 2xx is
/// an `UpstreamStatus` error. Bodies over `max_body_bytes` end the transfer
/// with `BodyTooLarge`.
/// Runs in the current thread; use [`fetch_async`] from async code.
pub fn fetch(url: &str, opts: &FetchOptions) -> Result<FetchOutcome, FetchError> {
    match url::Url::parse(url) {
        Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
        _ => {
            return Err(FetchError::UnsupportedScheme {
                url: url.to_string(),
            })
        }
    }

    let timeout = opts.timeout.max(MIN_DEADLINE);
    let connect_timeout = opts.connect_timeout.clamp(MIN_DEADLINE, timeout);

    let mut header_lines: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();
    let mut too_large = false;

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.max_redirections(opts.max_redirects)?;
    easy.useragent(&opts.user_agent)?;
    easy.connect_timeout(connect_timeout)?;
    easy.timeout(timeout)?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            header_lines.push(String::from_utf8_lossy(data).trim_end().to_string());
            true
        })?;
        transfer.write_function(|data| {
            if (body.len() + data.len()) as u64 > opts.max_body_bytes {
                too_large = true;
                // A short count makes curl abort with a write error.
                return Ok(0);
            }
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        let performed = transfer.perform();
        drop(transfer);
        if let Err(e) = performed {
            if too_large {
                return Err(FetchError::BodyTooLarge {
                    url: url.to_string(),
                    limit: opts.max_body_bytes,
                });
            }
            return Err(FetchError::from_curl(url, timeout.as_secs(), e));
        }
    }

    let status_code = easy.response_code()?;
    tracing::info!(url, status = status_code, bytes = body.len(), "GET completed");
    if !(200..300).contains(&status_code) {
        return Err(FetchError::UpstreamStatus {
            url: url.to_string(),
            status: status_code,
        });
    }

    let headers = parse::parse_headers(&header_lines);
    tracing::debug!(?headers, "response headers");
    let content_length = parse::content_length(&headers).or(Some(body.len() as u64));

    Ok(FetchOutcome {
        status_code,
        headers,
        body,
        content_length,
    })
}

/// Runs [`fetch`] on the blocking pool. The curl handle lives and dies inside
/// the task.
pub async fn fetch_async(url: String, opts: FetchOptions) -> Result<FetchOutcome, FetchError> {
    tokio::task::spawn_blocking(move || fetch(&url, &opts))
        .await
        .map_err(|e| FetchError::Task(e.to_string()))?
}
