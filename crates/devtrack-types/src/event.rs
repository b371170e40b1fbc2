//! Development event records.
//!
//! An [`Event`] is what the store hands back: validated, normalized, and
//! carrying its store-assigned [`EventId`]. A [`RawEvent`] is what arrives
//! on ingest, before any validation has run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::ids::EventId;

/// A single immutable record of a development-related occurrence.
///
/// Events are created exactly once on append and never mutated. The
/// `data` payload is opaque to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// Store-assigned identifier.
    pub id: EventId,
    /// When the event happened, normalized to UTC.
    pub timestamp: DateTime<Utc>,
    /// Producer of the event (e.g. `Shell`, `ClaudeHook`, `LogFile`).
    pub source: String,
    /// Producer-defined category of the event.
    pub event_type: String,
    /// Arbitrary structured payload.
    pub data: serde_json::Value,
}

/// An ingested event before validation.
///
/// Every field is optional so the store can report exactly which one is
/// missing or malformed. A key that is present with a JSON `null` value
/// deserializes to `Some(Value::Null)`, distinct from an absent key.
/// Unknown keys, including a caller-supplied `id`, are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// ISO-8601 timestamp string.
    #[serde(default, deserialize_with = "present")]
    pub timestamp: Option<serde_json::Value>,
    /// Event source.
    #[serde(default, deserialize_with = "present")]
    pub source: Option<serde_json::Value>,
    /// Event type.
    #[serde(default, deserialize_with = "present")]
    pub event_type: Option<serde_json::Value>,
    /// Structured payload.
    #[serde(default, deserialize_with = "present")]
    pub data: Option<serde_json::Value>,
}

impl RawEvent {
    /// Build a raw event from string fields and a payload.
    pub fn new(timestamp: &str, source: &str, event_type: &str, data: serde_json::Value) -> Self {
        Self {
            timestamp: Some(serde_json::Value::from(timestamp)),
            source: Some(serde_json::Value::from(source)),
            event_type: Some(serde_json::Value::from(event_type)),
            data: Some(data),
        }
    }
}

/// Deserialize a field that was present in the input, keeping `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}
