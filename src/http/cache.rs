//! Last-Modified / If-Modified-Since handling.
//!
//! HTTP dates have one-second resolution, so every comparison is done on
//! modification times truncated to whole seconds.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Drops the sub-second part of a timestamp.
pub fn truncate_to_seconds(time: SystemTime) -> SystemTime {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    UNIX_EPOCH + Duration::from_secs(secs)
}

/// Formats a timestamp as an RFC 1123 date, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn format_http_date(time: SystemTime) -> String {
    httpdate::fmt_http_date(truncate_to_seconds(time))
}

/// Parses an HTTP date. Returns `None` for anything unparseable.
pub fn parse_http_date(value: &str) -> Option<SystemTime> {
    httpdate::parse_http_date(value.trim()).ok()
}

/// Returns true when the client's cached copy is still current.
///
/// `last_modified` must already be truncated to seconds. An absent or
/// unparseable `If-Modified-Since` never matches.
pub fn is_not_modified(if_modified_since: Option<&str>, last_modified: SystemTime) -> bool {
    if_modified_since
        .and_then(parse_http_date)
        .is_some_and(|since| since >= last_modified)
}
