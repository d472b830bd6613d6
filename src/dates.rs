//! Front-matter timestamp parsing.
//!
//! Authors write dates in whatever shape their editor produces, so parsing is
//! lenient: RFC 3339, a handful of naive `YYYY-MM-DD[ HH:MM[:SS]]` layouts
//! (interpreted as UTC), and integer Unix seconds are all accepted. Anything
//! else parses to `None`, which callers treat as "no date".
//!
//! YAML front-matter is decoded into JSON values, so a bare `2024-01-15` in
//! YAML arrives here as the string `"2024-01-15"`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a front-matter value into a UTC timestamp.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => n.as_i64().and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        _ => None,
    }
}

/// Parse a timestamp string. See the module docs for accepted layouts.
pub fn parse_timestamp_str(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// True when `value` parses and is not later than `now`.
pub fn is_past(value: Option<&Value>, now: DateTime<Utc>) -> bool {
    value
        .and_then(parse_timestamp)
        .is_some_and(|ts| ts <= now)
}
