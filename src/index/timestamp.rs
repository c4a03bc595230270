//! Creation timestamps as stored in the index: `HH:MM DD-MM-YYYY`, 24-hour
//! clock, local time, minute precision.
//!
//! Decoding never fails: a missing or unparseable value becomes "now", so a
//! single bad record cannot make the whole index unreadable.

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serializer};

/// `strftime` pattern of the persisted timestamp.
pub const FORMAT: &str = "%H:%M %d-%m-%Y";

/// The current local time, truncated to the minute.
#[must_use]
pub fn now() -> NaiveDateTime {
    truncate(Local::now().naive_local())
}

/// Drop seconds and sub-second precision.
#[must_use]
pub fn truncate(at: NaiveDateTime) -> NaiveDateTime {
    at.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(at)
}

/// Format a timestamp the way the index stores it.
#[must_use]
pub fn format(at: &NaiveDateTime) -> String {
    at.format(FORMAT).to_string()
}

/// Parse a stored timestamp, returning `None` when it is malformed.
#[must_use]
pub fn parse(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), FORMAT).ok()
}

pub(crate) fn serialize<S: Serializer>(at: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(at))
}

pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<NaiveDateTime, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(parse)
        .unwrap_or_else(now))
}
