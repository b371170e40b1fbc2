//! DDL for the `events` table.
//!
//! There are no migrations: the schema is created by a single destructive
//! re-initialization. [`RESET_STATEMENTS`] run in order inside one
//! transaction, so a concurrent reader sees either the old table or the
//! new empty one.
//!
//! | Column | Type | Notes |
//! |--------|------|-------|
//! | `id` | `BIGINT` | `GENERATED ALWAYS AS IDENTITY`, restarts at 1 on reset |
//! | `occurred_at` | `TIMESTAMPTZ` | caller-supplied event time |
//! | `source` | `TEXT` | indexed |
//! | `event_type` | `TEXT` | indexed |
//! | `data` | `JSONB` | opaque payload |
//! | `search_text` | `TEXT` | lowercased serialized payload |

/// Name of the single events table.
pub const EVENTS_TABLE: &str = "events";

/// Statements that drop and recreate the events table.
pub const RESET_STATEMENTS: [&str; 5] = [
    "DROP TABLE IF EXISTS events",
    r"CREATE TABLE events (
        id          BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
        occurred_at TIMESTAMPTZ NOT NULL,
        source      TEXT NOT NULL,
        event_type  TEXT NOT NULL,
        data        JSONB NOT NULL,
        search_text TEXT NOT NULL
    )",
    "CREATE INDEX events_order_idx ON events (occurred_at DESC, id DESC)",
    "CREATE INDEX events_source_idx ON events (source)",
    "CREATE INDEX events_event_type_idx ON events (event_type)",
];
