//! Ingest validation.
//!
//! Turns a [`RawEvent`] into a [`NewEvent`] ready for persistence. All
//! checks run before the store touches any lock or connection, so a
//! rejected event can never leave a partial write behind.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use devtrack_types::RawEvent;
use serde_json::Value;

use crate::error::StoreError;
use crate::query::search_projection;

/// Layouts for a timestamp without a UTC offset, taken to be UTC.
///
/// `%.f` also accepts a missing fractional part.
const NAIVE_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
];

/// [`NAIVE_FORMATS`] followed by a numeric offset, with or without colon.
const OFFSET_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
    "%Y%m%dT%H%M%S%.f%z",
];

/// Sub-second digits kept, matching `TIMESTAMPTZ` precision.
const STORED_SUBSEC_DIGITS: u16 = 6;

/// A validated, normalized event that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    /// Parsed timestamp, normalized to UTC.
    pub timestamp: DateTime<Utc>,
    /// Trimmed, non-empty source.
    pub source: String,
    /// Trimmed, non-empty event type.
    pub event_type: String,
    /// Payload exactly as ingested.
    pub data: Value,
    /// Lowercased serialized payload used for free-text search.
    pub search_text: String,
}

/// Validate and normalize an ingested event.
///
/// # Errors
///
/// Returns [`StoreError::Validation`] if a required field is missing, has
/// the wrong JSON type, is blank after trimming, or contains a NUL
/// character, or if the timestamp is not ISO-8601.
///
/// The timestamp is truncated to microseconds so every backend stores
/// and orders the same instant.
pub fn validate(raw: RawEvent) -> Result<NewEvent, StoreError> {
    let timestamp = required_string(raw.timestamp, "timestamp")?;
    let source = required_string(raw.source, "source")?;
    let event_type = required_string(raw.event_type, "event_type")?;
    let data = raw
        .data
        .ok_or_else(|| StoreError::validation("missing field `data`"))?;

    let timestamp = parse_timestamp(&timestamp)?.trunc_subsecs(STORED_SUBSEC_DIGITS);
    let source = non_blank(&source, "source")?;
    let event_type = non_blank(&event_type, "event_type")?;
    reject_nul(&source, "source")?;
    reject_nul(&event_type, "event_type")?;
    reject_nul_in_payload(&data)?;
    let search_text = search_projection(&data);

    Ok(NewEvent {
        timestamp,
        source,
        event_type,
        data,
        search_text,
    })
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts extended (`2024-03-01T10:00:00`) and basic (`20240301T100000`)
/// date-times, a `T` or space separator, optional seconds in the extended
/// form, a `.` or `,` before the fraction, and an offset written as `Z`,
/// `+02:00` or `+0200`. A missing offset means UTC. Date-only values are
/// rejected.
///
/// # Errors
///
/// Returns [`StoreError::Validation`] if no accepted layout matches.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, StoreError> {
    let trimmed = input.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    let normalized = trimmed.replace(',', ".");
    let parsed = match normalized.strip_suffix(['Z', 'z']) {
        Some(utc) => parse_naive(utc),
        None => OFFSET_FORMATS
            .iter()
            .find_map(|format| DateTime::parse_from_str(&normalized, format).ok())
            .map(|parsed| parsed.with_timezone(&Utc))
            .or_else(|| parse_naive(&normalized)),
    };

    parsed.ok_or_else(|| StoreError::validation(format!("invalid ISO-8601 timestamp: {input:?}")))
}

fn parse_naive(input: &str) -> Option<DateTime<Utc>> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .map(|naive| naive.and_utc())
}

fn required_string(value: Option<Value>, field: &str) -> Result<String, StoreError> {
    match value {
        None => Err(StoreError::validation(format!("missing field `{field}`"))),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(StoreError::validation(format!(
            "field `{field}` must be a string, got {}",
            json_kind(&other)
        ))),
    }
}

fn non_blank(value: &str, field: &str) -> Result<String, StoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::validation(format!("field `{field}` must not be empty")));
    }
    Ok(trimmed.to_owned())
}

fn reject_nul(value: &str, field: &str) -> Result<(), StoreError> {
    if value.contains('\0') {
        return Err(StoreError::validation(format!(
            "field `{field}` must not contain NUL characters"
        )));
    }
    Ok(())
}

/// `PostgreSQL` refuses U+0000 in `TEXT` and `JSONB`, so it is refused in
/// every payload key and string up front.
fn reject_nul_in_payload(value: &Value) -> Result<(), StoreError> {
    match value {
        Value::String(s) => reject_nul(s, "data"),
        Value::Array(items) => items.iter().try_for_each(reject_nul_in_payload),
        Value::Object(map) => map.iter().try_for_each(|(key, item)| {
            reject_nul(key, "data")?;
            reject_nul_in_payload(item)
        }),
        Value::Null | Value::Bool(_) | Value::Number(_) => Ok(()),
    }
}

/// Name of a JSON value's type, for error messages.
pub const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
