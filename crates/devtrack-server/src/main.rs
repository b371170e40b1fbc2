//! Server binary for the development event tracker.
//!
//! Wires configuration, logging, the event store and the HTTP API
//! together, then serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (`devtrack-config.yaml` + environment)
//! 2. Initialize structured logging (tracing)
//! 3. Open the event store (`PostgreSQL` pool or in-process table)
//! 4. Optionally run the destructive initialization
//! 5. Start the API server

mod config;
mod error;

use std::sync::Arc;

use devtrack_api::{AppState, start_server};
use devtrack_db::{EventStore, PostgresPool};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{DevtrackConfig, LoggingConfig, StorageBackend, StorageConfig};
use crate::error::DevtrackError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, store setup, or the server fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = DevtrackConfig::load().map_err(DevtrackError::from)?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(
        backend = ?config.storage.backend,
        host = config.http.host,
        port = config.http.port,
        "devtrack-server starting"
    );

    // 3. Open the event store.
    let store = open_store(&config.storage).await?;

    // 4. Optional destructive initialization.
    if config.storage.init_on_start {
        store.initialize().await.map_err(DevtrackError::from)?;
    }

    // 5. Serve.
    let state = Arc::new(AppState::new(store));
    start_server(&config.http.server_config(), state)
        .await
        .map_err(DevtrackError::from)?;

    info!("devtrack-server stopped");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Build the event store for the configured backend.
async fn open_store(storage: &StorageConfig) -> Result<EventStore, DevtrackError> {
    match storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-process event store; events are lost on restart");
            Ok(EventStore::in_memory())
        }
        StorageBackend::Postgres => {
            let pg = storage.postgres_config();
            let pool = if storage.lazy_connect {
                PostgresPool::connect_lazy(&pg)?
            } else {
                PostgresPool::connect(&pg).await?
            };
            Ok(EventStore::postgres(pool))
        }
    }
}
