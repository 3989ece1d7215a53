//! Request normalization: raw body text to a validated target URL.

mod error;

pub use error::RequestError;

use serde_json::Value;

/// The validated input of one analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub url: String,
}

/// Parses the raw request body and validates its `url` field.
///
/// An absent body is treated like an empty one and is therefore malformed.
/// Falsy `url` values (`null`, `false`, `0`, `""`) and non-object payloads
/// count as a missing field.
pub fn parse_request(body: Option<&str>) -> Result<AnalysisRequest, RequestError> {
    let raw = body.unwrap_or("");
    tracing::debug!(body = raw, "normalizing request");

    let value: Value = serde_json::from_str(raw).map_err(|e| {
        tracing::debug!("JSON parse error: {}", e);
        RequestError::MalformedPayload(e)
    })?;

    let url = match value.get("url") {
        Some(v) if is_truthy(v) => v,
        _ => return Err(RequestError::MissingField),
    };

    let input = match url {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    validate_url(&input)?;

    Ok(AnalysisRequest { url: input })
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Absolute URL check: must parse and carry a non-empty host.
fn validate_url(input: &str) -> Result<(), RequestError> {
    let parsed = url::Url::parse(input).map_err(|e| RequestError::InvalidUrl {
        input: input.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.host_str() {
        Some(h) if !h.is_empty() => Ok(()),
        _ => Err(RequestError::InvalidUrl {
            input: input.to_string(),
            reason: "URL has no host".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_url_passes_through_unchanged() {
        let req = parse_request(Some(r#"{"url": "https://example.com/a.png?x=1"}"#)).unwrap();
        assert_eq!(req.url, "https://example.com/a.png?x=1");
    }

    #[test]
    fn malformed_json() {
        let err = parse_request(Some("{not json")).unwrap_err();
        assert!(matches!(err, RequestError::MalformedPayload(_)));
    }

    #[test]
    fn absent_body_is_malformed() {
        assert!(matches!(
            parse_request(None).unwrap_err(),
            RequestError::MalformedPayload(_)
        ));
    }

    #[test]
    fn missing_or_falsy_url() {
        for body in [
            r#"{}"#,
            r#"{"url": ""}"#,
            r#"{"url": null}"#,
            r#"{"url": false}"#,
            r#"{"url": 0}"#,
            r#"{"other": "https://example.com"}"#,
            r#"[]"#,
            r#""https://example.com""#,
        ] {
            assert!(
                matches!(parse_request(Some(body)).unwrap_err(), RequestError::MissingField),
                "body {} should be MissingField",
                body
            );
        }
    }

    #[test]
    fn not_a_url() {
        let err = parse_request(Some(r#"{"url": "not-a-url"}"#)).unwrap_err();
        assert!(matches!(err, RequestError::InvalidUrl { .. }));
    }

    #[test]
    fn url_without_host_is_invalid() {
        let err = parse_request(Some(r#"{"url": "mailto:someone@example.com"}"#)).unwrap_err();
        assert!(matches!(err, RequestError::InvalidUrl { .. }));
    }

    #[test]
    fn truthy_non_string_url_is_invalid() {
        let err = parse_request(Some(r#"{"url": 42}"#)).unwrap_err();
        assert!(matches!(err, RequestError::InvalidUrl { .. }));
    }
}
