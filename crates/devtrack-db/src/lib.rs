//! Event store and query engine for the development event tracker.
//!
//! Events arrive from shell hooks, AI-assistant hooks and log tailers, are
//! validated and normalized here, and persisted either to `PostgreSQL` or to
//! an in-process table. Retrieval compiles an optional filter set into a
//! single ordered read.
//!
//! # Architecture
//!
//! ```text
//! append(RawEvent)
//!     |
//!     +-- validate ----------> NewEvent (+ search projection)
//!     |
//!     +-- EventStore (dataset barrier, shared)
//!         |-- PgEventTable      (IDENTITY id, JSONB payload)
//!         +-- MemoryEventTable  (counter under a narrow write lock)
//!
//! query(EventFilter)
//!     |
//!     +-- CompiledQuery -------> SQL text + binds | in-process predicate
//! ```
//!
//! # Modules
//!
//! - [`event_store`] -- The store facade: initialize, append, query
//! - [`query`] -- Filter compilation, search projection, ordering
//! - [`validate`] -- Ingest validation and timestamp parsing
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`pg_events`] -- `events` table operations on `PostgreSQL`
//! - [`memory`] -- In-process `events` table
//! - [`schema`] -- DDL for the destructive re-initialization
//! - [`error`] -- Shared error types

pub mod error;
pub mod event_store;
pub mod memory;
pub mod pg_events;
pub mod postgres;
pub mod query;
pub mod schema;
pub mod validate;

// Re-export primary types for convenience.
pub use error::StoreError;
pub use event_store::{Backend, EventStore, StoreStatus};
pub use memory::MemoryEventTable;
pub use pg_events::{EventRow, PgEventTable};
pub use postgres::{PostgresConfig, PostgresPool};
pub use query::{CompiledQuery, Predicate};
pub use validate::NewEvent;
