//! Row entities
//!
//! One struct per table row, read with `from_row` against the matching
//! `COLUMNS` list and translated to the domain types with `into_domain`.
//! The translation never fails: malformed JSON columns read as empty and
//! unreadable timestamps read as the epoch.

mod capacity;
mod employee;
mod project;

pub use capacity::*;
pub use employee::*;
pub use project::*;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Format used by SQLite's `CURRENT_TIMESTAMP`
const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp text for a new row
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse RFC 3339, falling back to the SQLite default format
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, SQLITE_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

fn timestamp_or_epoch(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(parse_timestamp).unwrap_or_default()
}

fn json_or_default<T: serde::de::DeserializeOwned + Default>(raw: &str) -> T {
    serde_json::from_str(raw).unwrap_or_default()
}
