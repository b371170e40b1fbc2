//! The event store: initialize, append, query.
//!
//! [`EventStore`] is the sole authority over id assignment and ordering.
//! It owns a storage [`Backend`] and an explicit dataset barrier:
//!
//! - `append` and `query` hold the barrier shared, so they run fully in
//!   parallel with each other;
//! - `initialize` holds it exclusively, so no other operation can observe
//!   a mix of pre- and post-reset data.
//!
//! Validation and timestamp parsing happen before the barrier is taken.
//! Ids are assigned by the backend's own atomic sequence (an identity
//! column, or a counter advanced under the memory table's write lock).
//!
//! The store never logs failures and never renders user-facing text;
//! every error is returned to the caller as a [`StoreError`].

use devtrack_types::{Event, EventFilter, EventId, RawEvent};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::memory::MemoryEventTable;
use crate::pg_events::PgEventTable;
use crate::postgres::PostgresPool;
use crate::validate::validate;

/// Where events are persisted.
pub enum Backend {
    /// A `PostgreSQL` database reached through a pool.
    Postgres(PostgresPool),
    /// The in-process table.
    Memory(MemoryEventTable),
}

impl Backend {
    /// Short name for logs and health output.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }
}

/// Observable state of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct StoreStatus {
    /// Whether `initialize` has created the events table.
    pub initialized: bool,
    /// Number of stored events (0 when uninitialized).
    pub events: u64,
}

/// Durable persistence and retrieval of development events.
pub struct EventStore {
    backend: Backend,
    barrier: RwLock<()>,
}

impl EventStore {
    /// Create a store over an arbitrary backend.
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            barrier: RwLock::new(()),
        }
    }

    /// Create a store over an existing `PostgreSQL` pool.
    pub fn postgres(pool: PostgresPool) -> Self {
        Self::new(Backend::Postgres(pool))
    }

    /// Create an uninitialized in-process store.
    pub fn in_memory() -> Self {
        Self::new(Backend::Memory(MemoryEventTable::new()))
    }

    /// The backend this store persists to.
    pub const fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Drop and recreate the events table.
    ///
    /// Safe on a store that was never initialized and idempotent in end
    /// state. Acts as an exclusive barrier against every other operation.
    /// The id sequence restarts at [`EventId::FIRST`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StorageUnavailable`] if the reset fails.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        let _exclusive = self.barrier.write().await;

        match &self.backend {
            Backend::Postgres(pool) => PgEventTable::new(pool.pool()).reset().await?,
            Backend::Memory(table) => table.reset().await,
        }

        tracing::info!(backend = self.backend.name(), "Event store initialized");
        Ok(())
    }

    /// Validate, normalize and persist one event.
    ///
    /// Returns the id assigned to it. Once this returns, the event is
    /// visible to every subsequent [`EventStore::query`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for a malformed event (the store
    /// is not touched), [`StoreError::NotInitialized`] before the first
    /// `initialize`, or [`StoreError::StorageUnavailable`] if the write
    /// fails.
    pub async fn append(&self, raw: RawEvent) -> Result<EventId, StoreError> {
        let event = validate(raw)?;

        let _shared = self.barrier.read().await;
        let id = match &self.backend {
            Backend::Postgres(pool) => PgEventTable::new(pool.pool()).insert(&event).await?,
            Backend::Memory(table) => table.insert(event).await?,
        };

        tracing::debug!(%id, "Event appended");
        Ok(id)
    }

    /// Return every event matching the filter, newest first.
    ///
    /// Ties on timestamp are broken by the later id. An empty result is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotInitialized`] before the first
    /// `initialize`, or [`StoreError::StorageUnavailable`] if the read
    /// fails.
    pub async fn query(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError> {
        let _shared = self.barrier.read().await;
        let events = match &self.backend {
            Backend::Postgres(pool) => PgEventTable::new(pool.pool()).select(filter).await?,
            Backend::Memory(table) => table.select(filter).await?,
        };

        tracing::debug!(count = events.len(), "Events queried");
        Ok(events)
    }

    /// Report whether the store is initialized and how many events it holds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StorageUnavailable`] if the count fails.
    pub async fn status(&self) -> Result<StoreStatus, StoreError> {
        let _shared = self.barrier.read().await;
        let count = match &self.backend {
            Backend::Postgres(pool) => PgEventTable::new(pool.pool()).count().await,
            Backend::Memory(table) => table.count().await,
        };

        match count {
            Ok(events) => Ok(StoreStatus {
                initialized: true,
                events,
            }),
            Err(StoreError::NotInitialized) => Ok(StoreStatus {
                initialized: false,
                events: 0,
            }),
            Err(e) => Err(e),
        }
    }
}
