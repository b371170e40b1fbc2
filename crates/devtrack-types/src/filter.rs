//! The optional filter set accepted by event retrieval.

use serde::{Deserialize, Serialize};

/// Three independent, optional retrieval constraints.
///
/// `None` means "no constraint from this field". Blank strings coming from
/// optional form fields are indistinguishable from no input, so
/// [`EventFilter::normalized`] turns them into `None` before compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    /// Exact, case-sensitive match against `source`.
    pub source: Option<String>,
    /// Exact, case-sensitive match against `event_type`.
    pub event_type: Option<String>,
    /// Case-insensitive substring search over the serialized payload.
    pub query: Option<String>,
}

impl EventFilter {
    /// A filter that matches every event.
    pub const fn all() -> Self {
        Self {
            source: None,
            event_type: None,
            query: None,
        }
    }

    /// Constrain to an exact `source`.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Constrain to an exact `event_type`.
    #[must_use]
    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Constrain to payloads containing `query`.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Drop every field that is blank after trimming.
    ///
    /// Non-blank values are kept verbatim: exact matches do not trim.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            source: non_blank(self.source.as_deref()),
            event_type: non_blank(self.event_type.as_deref()),
            query: non_blank(self.query.as_deref()),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_owned)
}
