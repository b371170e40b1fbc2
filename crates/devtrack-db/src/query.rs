//! Filter compilation.
//!
//! An [`EventFilter`] carries up to three independent constraints. This
//! module normalizes it, compiles the present constraints into
//! [`Predicate`]s that combine with logical AND, and renders the result
//! two ways: as parameterized SQL for `PostgreSQL` and as an in-process
//! predicate for the memory table. Both renderings share one matching
//! policy:
//!
//! - `source` / `event_type`: exact, case-sensitive equality
//! - `query`: case-insensitive substring of the serialized payload
//! - blank filter fields are absent, never "equals empty"
//!
//! Results are always ordered newest first, ties broken by the later id.

use std::cmp::Ordering;
use std::fmt::Write as _;

use devtrack_types::{Event, EventFilter};

use crate::schema::EVENTS_TABLE;

/// Columns selected for every retrieval, in [`crate::EventRow`] order.
const SELECT_COLUMNS: &str = "id, occurred_at, source, event_type, data";

/// Retrieval order: `timestamp` descending, then `id` descending.
const ORDER_BY: &str = "occurred_at DESC, id DESC";

/// A single compiled constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `source` equals the value exactly.
    SourceEquals(String),
    /// `event_type` equals the value exactly.
    EventTypeEquals(String),
    /// The search projection contains the value, which is already lowercased.
    PayloadContains(String),
}

impl Predicate {
    /// The value bound for this predicate's SQL placeholder.
    pub fn bind_value(&self) -> &str {
        match self {
            Self::SourceEquals(v) | Self::EventTypeEquals(v) | Self::PayloadContains(v) => v,
        }
    }

    /// Render this predicate as a SQL condition on placeholder `$n`.
    fn sql_condition(&self, placeholder: usize) -> String {
        match self {
            Self::SourceEquals(_) => format!("source = ${placeholder}"),
            Self::EventTypeEquals(_) => format!("event_type = ${placeholder}"),
            // strpos keeps `%` and `_` literal, unlike LIKE.
            Self::PayloadContains(_) => format!("strpos(search_text, ${placeholder}) > 0"),
        }
    }

    /// Evaluate this predicate against an event and its search projection.
    fn holds(&self, event: &Event, search_text: &str) -> bool {
        match self {
            Self::SourceEquals(v) => event.source == *v,
            Self::EventTypeEquals(v) => event.event_type == *v,
            Self::PayloadContains(v) => search_text.contains(v.as_str()),
        }
    }
}

/// A filter set compiled into AND-combined predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledQuery {
    predicates: Vec<Predicate>,
}

impl CompiledQuery {
    /// Compile a filter set.
    ///
    /// Predicates appear in the fixed order `source`, `event_type`,
    /// `query`, which is also the order of the SQL bind parameters.
    pub fn compile(filter: &EventFilter) -> Self {
        let filter = filter.normalized();
        let mut predicates = Vec::with_capacity(3);

        if let Some(source) = filter.source {
            predicates.push(Predicate::SourceEquals(source));
        }
        if let Some(event_type) = filter.event_type {
            predicates.push(Predicate::EventTypeEquals(event_type));
        }
        if let Some(query) = filter.query {
            predicates.push(Predicate::PayloadContains(projected_term(&query)));
        }

        Self { predicates }
    }

    /// Bind values for the placeholders of [`CompiledQuery::to_sql`], in order.
    pub fn bind_values(&self) -> impl Iterator<Item = &str> {
        self.predicates.iter().map(Predicate::bind_value)
    }

    /// Render the full retrieval statement.
    pub fn to_sql(&self) -> String {
        let mut sql = format!("SELECT {SELECT_COLUMNS} FROM {EVENTS_TABLE}");

        for (index, predicate) in self.predicates.iter().enumerate() {
            let keyword = if index == 0 { "WHERE" } else { "AND" };
            let placeholder = index.saturating_add(1);
            let _ = write!(sql, " {keyword} {}", predicate.sql_condition(placeholder));
        }

        let _ = write!(sql, " ORDER BY {ORDER_BY}");
        sql
    }

    /// Whether an event satisfies every predicate.
    pub fn matches(&self, event: &Event, search_text: &str) -> bool {
        self.predicates.iter().all(|p| p.holds(event, search_text))
    }
}

/// Searchable text projection of a payload.
///
/// The lowercased compact JSON serialization, so keys and values at any
/// nesting depth are covered by a single substring test.
pub fn search_projection(data: &serde_json::Value) -> String {
    data.to_string().to_lowercase()
}

/// A search term in the form it takes inside [`search_projection`].
///
/// The projection is serialized JSON, so `"` and `\` in payload strings
/// appear escaped there. The term is escaped the same way, which lets a
/// literal `C:\tmp` or `say "hi"` find the value it was ingested as.
fn projected_term(term: &str) -> String {
    let quoted = serde_json::Value::from(term.to_lowercase()).to_string();
    quoted
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .map_or_else(|| quoted.clone(), str::to_owned)
}

/// Retrieval order: newer timestamps first, later ids first on ties.
pub fn newest_first(a: &Event, b: &Event) -> Ordering {
    b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id))
}
