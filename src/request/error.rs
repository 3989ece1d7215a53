//! Rejections produced while normalizing the inbound payload.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    /// Body is not well-formed JSON.
    #[error("malformed payload: {0}")]
    MalformedPayload(#[source] serde_json::Error),
    /// No `url` key, or its value is falsy.
    #[error("url field is missing or empty")]
    MissingField,
    /// `url` is present but is not an absolute URL with scheme and host.
    #[error("invalid url {input:?}: {reason}")]
    InvalidUrl { input: String, reason: String },
}
