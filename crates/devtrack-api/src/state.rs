//! Shared application state for the API server.

use std::sync::Arc;

use devtrack_db::EventStore;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. The store
/// does its own synchronization, so handlers never lock here.
#[derive(Clone)]
pub struct AppState {
    /// The event store every handler reads from and writes to.
    pub store: Arc<EventStore>,
}

impl AppState {
    /// Create application state around a store.
    pub fn new(store: EventStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Create application state backed by an uninitialized in-process store.
    pub fn in_memory() -> Self {
        Self::new(EventStore::in_memory())
    }
}
