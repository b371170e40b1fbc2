//! Ingest and query HTTP API for the development event tracker.
//!
//! This crate provides an Axum HTTP server in front of the
//! [`EventStore`](devtrack_db::EventStore):
//!
//! - **`/init`** re-creates the events table (destructive)
//! - **`/ingest`** accepts one JSON event per request from shell hooks,
//!   AI-assistant hooks and log tailers
//! - **`/events`** returns events filtered by `source`, `event_type` and
//!   free-text `q`, newest first
//! - **`/health`** reports store status
//!
//! The HTTP layer owns status-code mapping and user-visible error text;
//! the store only returns typed errors.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
