//! In-process `events` table.
//!
//! Mirrors the `PostgreSQL` table for local runs and tests. The dataset is
//! `None` until the first reset so that uninitialized access fails the
//! same way on both backends. The id counter lives inside the dataset and
//! is advanced under the write lock together with the push, so two
//! concurrent inserts can never observe the same id.

use devtrack_types::{Event, EventFilter, EventId};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::query::{CompiledQuery, newest_first};
use crate::validate::NewEvent;

/// A stored event together with its search projection.
#[derive(Debug, Clone)]
struct StoredEvent {
    event: Event,
    search_text: String,
}

/// The current generation of stored events.
#[derive(Debug)]
struct Dataset {
    events: Vec<StoredEvent>,
    next_id: EventId,
}

impl Dataset {
    const fn empty() -> Self {
        Self {
            events: Vec::new(),
            next_id: EventId::FIRST,
        }
    }
}

/// Events held in process memory.
#[derive(Debug, Default)]
pub struct MemoryEventTable {
    dataset: RwLock<Option<Dataset>>,
}

impl MemoryEventTable {
    /// Create an uninitialized table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all events and restart the id sequence.
    pub async fn reset(&self) {
        *self.dataset.write().await = Some(Dataset::empty());
    }

    /// Store one validated event and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotInitialized`] before the first reset, or
    /// [`StoreError::StorageUnavailable`] if the id sequence is exhausted.
    pub async fn insert(&self, event: NewEvent) -> Result<EventId, StoreError> {
        let mut guard = self.dataset.write().await;
        let dataset = guard.as_mut().ok_or(StoreError::NotInitialized)?;

        let id = dataset.next_id;
        dataset.next_id = id
            .next()
            .ok_or_else(|| StoreError::StorageUnavailable("event id sequence exhausted".to_owned()))?;

        dataset.events.push(StoredEvent {
            event: Event {
                id,
                timestamp: event.timestamp,
                source: event.source,
                event_type: event.event_type,
                data: event.data,
            },
            search_text: event.search_text,
        });

        Ok(id)
    }

    /// Fetch every event matching the filter, newest first.
    ///
    /// Matching runs under the read lock; sorting runs after it is
    /// released, on the copied snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotInitialized`] before the first reset.
    pub async fn select(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError> {
        let compiled = CompiledQuery::compile(filter);

        let mut events: Vec<Event> = {
            let guard = self.dataset.read().await;
            let dataset = guard.as_ref().ok_or(StoreError::NotInitialized)?;
            dataset
                .events
                .iter()
                .filter(|stored| compiled.matches(&stored.event, &stored.search_text))
                .map(|stored| stored.event.clone())
                .collect()
        };

        events.sort_by(newest_first);
        Ok(events)
    }

    /// Count stored events.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotInitialized`] before the first reset.
    pub async fn count(&self) -> Result<u64, StoreError> {
        let guard = self.dataset.read().await;
        let dataset = guard.as_ref().ok_or(StoreError::NotInitialized)?;
        Ok(u64::try_from(dataset.events.len()).unwrap_or(u64::MAX))
    }
}
