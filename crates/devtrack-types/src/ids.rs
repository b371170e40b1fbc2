//! Store-assigned event identifier.
//!
//! Ids come from a single monotonic sequence owned by the event store.
//! Callers never supply one; the sequence restarts at [`EventId::FIRST`]
//! after every destructive re-initialization.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Monotonically increasing identifier of a stored event.
///
/// Larger ids were appended later. Serialized as a bare JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct EventId(#[ts(type = "number")] pub i64);

impl EventId {
    /// The first id handed out by a freshly initialized store.
    pub const FIRST: Self = Self(1);

    /// Return the inner integer value.
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// The id following this one, or `None` on overflow.
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }
}

impl core::fmt::Display for EventId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EventId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<EventId> for i64 {
    fn from(id: EventId) -> Self {
        id.0
    }
}
