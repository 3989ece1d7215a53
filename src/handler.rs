//! Invocation boundary: method rules, the analysis pipeline, CORS headers.
//!
//! The hosting collaborator hands over a method and a raw body and forwards
//! whatever comes back unchanged. Nothing is retained between calls.

use crate::classify::{classify, Failure, GENERIC_FAILURE};
use crate::compose::{compose, AnalysisResult};
use crate::config::VerifierConfig;
use crate::fetch::{fetch_async, FetchOptions};
use crate::request::parse_request;
use crate::sniff::sniff;
use serde::Serialize;
use std::collections::BTreeMap;

/// Headers attached to every response, success or error.
pub const CORS_HEADERS: [(&str, &str); 4] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Headers", "Content-Type"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Content-Type", "application/json"),
];

/// Normalized inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerRequest {
    /// Upper-case HTTP method.
    pub method: String,
    pub body: Option<String>,
}

impl HandlerRequest {
    pub fn post(body: impl Into<String>) -> Self {
        Self {
            method: "POST".to_string(),
            body: Some(body.into()),
        }
    }
}

/// Normalized outbound response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    /// JSON text; empty only for a preflight.
    pub body: String,
}

impl HandlerResponse {
    fn new(status_code: u16, body: String) -> Self {
        let headers = CORS_HEADERS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            status_code,
            headers,
            body,
        }
    }

    fn json<T: Serialize>(status_code: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self::new(status_code, body),
            Err(e) => {
                tracing::error!("response serialization failed: {}", e);
                Self::new(500, format!(r#"{{"error":"{}"}}"#, GENERIC_FAILURE))
            }
        }
    }

    fn failure(failure: &Failure) -> Self {
        let classified = classify(failure);
        Self::json(classified.status, &classified.body)
    }
}

/// Entry point for one invocation.
pub async fn handle(req: HandlerRequest, cfg: &VerifierConfig) -> HandlerResponse {
    match req.method.as_str() {
        "OPTIONS" => return HandlerResponse::new(200, String::new()),
        "POST" => {}
        other => return HandlerResponse::failure(&Failure::MethodNotAllowed(other.to_string())),
    }
    tracing::info!(method = %req.method, "function called");

    match analyze(req.body.as_deref(), cfg).await {
        Ok(result) => HandlerResponse::json(200, &result),
        Err(failure) => HandlerResponse::failure(&failure),
    }
}

/// Normalize, fetch, sniff, compose. A failed sniff is still `Ok`.
pub async fn analyze(body: Option<&str>, cfg: &VerifierConfig) -> Result<AnalysisResult, Failure> {
    let request = parse_request(body)?;
    tracing::info!(url = %request.url, "testing URL");

    let outcome = fetch_async(request.url.clone(), FetchOptions::from(cfg)).await?;

    let sniffed = sniff(&outcome.body);
    if let Err(e) = &sniffed {
        tracing::warn!(url = %request.url, "could not analyze image: {}", e);
    }
    let result = compose(&request.url, &outcome, sniffed);
    tracing::debug!(?result, "returning result");
    Ok(result)
}
