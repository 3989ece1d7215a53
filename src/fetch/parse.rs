//! Parse raw HTTP response header lines into a header map.

use std::collections::BTreeMap;

/// Parse collected header lines into a map with lowercased names.
///
/// curl reports the headers of every response it sees (redirects, `100
/// Continue`), so each status line starts a fresh map and only the final
/// response survives. Repeated names are joined with `", "`.
pub(crate) fn parse_headers(lines: &[String]) -> BTreeMap<String, String> {
    let mut headers: BTreeMap<String, String> = BTreeMap::new();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            headers.clear();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            headers
                .entry(name)
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }
    }

    headers
}

/// `Content-Length` as an integer, if present and well-formed.
pub(crate) fn content_length(headers: &BTreeMap<String, String>) -> Option<u64> {
    headers
        .get("content-length")
        .and_then(|v| v.trim().parse::<u64>().ok())
}
