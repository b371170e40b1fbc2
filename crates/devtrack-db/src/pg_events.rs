//! `events` table operations on `PostgreSQL`.
//!
//! Id assignment is delegated to the table's identity column, so
//! concurrent inserts never need an in-process lock. Statements are built
//! at runtime; every filter value is a bound parameter.

use chrono::{DateTime, Utc};
use devtrack_types::{Event, EventFilter, EventId};
use sqlx::PgPool;

use crate::error::StoreError;
use crate::query::CompiledQuery;
use crate::schema::RESET_STATEMENTS;
use crate::validate::NewEvent;

/// Operations on the `events` table.
pub struct PgEventTable<'a> {
    pool: &'a PgPool,
}

impl<'a> PgEventTable<'a> {
    /// Create a table handle bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Drop and recreate the table in a single transaction.
    ///
    /// The identity sequence is recreated with the table and restarts at 1.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StorageUnavailable`] if any statement fails;
    /// the transaction is rolled back and the previous table survives.
    pub async fn reset(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        for statement in RESET_STATEMENTS {
            sqlx::query(statement).execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Insert one validated event and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotInitialized`] if the table does not exist,
    /// or [`StoreError::StorageUnavailable`] if the insert fails.
    pub async fn insert(&self, event: &NewEvent) -> Result<EventId, StoreError> {
        let (id,): (i64,) = sqlx::query_as(
            r"INSERT INTO events (occurred_at, source, event_type, data, search_text)
              VALUES ($1, $2, $3, $4, $5)
              RETURNING id",
        )
        .bind(event.timestamp)
        .bind(&event.source)
        .bind(&event.event_type)
        .bind(&event.data)
        .bind(&event.search_text)
        .fetch_one(self.pool)
        .await?;

        Ok(EventId(id))
    }

    /// Fetch every event matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotInitialized`] if the table does not exist,
    /// or [`StoreError::StorageUnavailable`] if the query fails.
    pub async fn select(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError> {
        let compiled = CompiledQuery::compile(filter);
        let sql = compiled.to_sql();

        let mut query = sqlx::query_as::<_, EventRow>(&sql);
        for value in compiled.bind_values() {
            query = query.bind(value);
        }

        let rows = query.fetch_all(self.pool).await?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    /// Count stored events.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotInitialized`] if the table does not exist,
    /// or [`StoreError::StorageUnavailable`] if the query fails.
    pub async fn count(&self) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

/// A row from the `events` table.
///
/// Uses runtime types rather than compile-time checked types to
/// avoid requiring a live database during builds.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    /// Identity-assigned event ID.
    pub id: i64,
    /// Caller-supplied event time.
    pub occurred_at: DateTime<Utc>,
    /// Event source.
    pub source: String,
    /// Event type.
    pub event_type: String,
    /// Opaque payload.
    pub data: serde_json::Value,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: EventId(row.id),
            timestamp: row.occurred_at,
            source: row.source,
            event_type: row.event_type,
            data: row.data,
        }
    }
}
