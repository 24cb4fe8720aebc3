//! Common types used across the capacity tracker

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The kinds of record the tracker stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    TaskGroup,
    Metric,
    Employee,
    CapacityEntry,
}

impl EntityKind {
    /// Human readable label, used in "<Kind> not found" messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::Project => "Project",
            Self::TaskGroup => "Task group",
            Self::Metric => "Metric",
            Self::Employee => "Employee",
            Self::CapacityEntry => "Capacity entry",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coerce an external numeric field to `f64`.
///
/// Numbers pass through. Strings are read the way a lenient form parser
/// would: leading whitespace is skipped and the longest numeric prefix is
/// used (`"2.5h"` is `2.5`). Anything else, including absent values,
/// unparseable strings and non-finite results, becomes `0.0`.
pub fn coerce_number(value: Option<&serde_json::Value>) -> f64 {
    let parsed = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => parse_numeric_prefix(s),
        _ => 0.0,
    };
    if parsed.is_finite() {
        parsed
    } else {
        0.0
    }
}

fn parse_numeric_prefix(raw: &str) -> f64 {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return 0.0;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(0.0)
}

/// Deserialize an explicit `null` as the field's default. Pair with
/// `#[serde(default)]` so an absent field defaults too.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a field where `null` differs from absent: absent is `None`
/// (via `#[serde(default)]`), `null` is `Some(None)`.
pub fn null_as_clear<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
