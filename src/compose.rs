//! Assembles the success-path response body from a fetch and a sniff.

use crate::fetch::FetchOutcome;
use crate::sniff::{ImageFormat, ImageMetadata, SniffError};
use serde::Serialize;
use std::collections::BTreeMap;

pub const SUCCESS_MESSAGE: &str = "Image analysis successful.";
pub const FAILURE_MESSAGE: &str = "Could not analyze image.";

/// JSON body of a 200 response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub url: String,
    /// True iff the image format and dimensions were sniffed.
    pub success: bool,
    pub file_size: Option<u64>,
    #[serde(rename = "fileSizeKB")]
    pub file_size_kb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(rename = "type")]
    pub image_type: Option<ImageFormat>,
    pub message: String,
    /// Sniff failure reason; only set when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u32>,
    /// Headers of the fetched resource, not of this response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
}

/// Bytes to KiB rounded to two decimals.
pub fn size_in_kb(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 * 100.0).round() / 100.0
}

/// Merges transport metadata with the sniff outcome. Never fails.
pub fn compose(
    url: &str,
    outcome: &FetchOutcome,
    sniffed: Result<ImageMetadata, SniffError>,
) -> AnalysisResult {
    // A zero length is reported as unknown.
    let file_size = outcome.content_length.filter(|&n| n > 0);
    let (meta, note) = match sniffed {
        Ok(meta) => (Some(meta), None),
        Err(e) => (None, Some(e.to_string())),
    };

    AnalysisResult {
        url: url.to_string(),
        success: meta.is_some(),
        file_size,
        file_size_kb: file_size.map(size_in_kb),
        content_type: outcome.content_type().map(str::to_string),
        width: meta.map(|m| m.width),
        height: meta.map(|m| m.height),
        image_type: meta.map(|m| m.format),
        message: if meta.is_some() {
            SUCCESS_MESSAGE
        } else {
            FAILURE_MESSAGE
        }
        .to_string(),
        note,
        http_status: Some(outcome.status_code),
        headers: Some(outcome.headers.clone()),
    }
}
