//! Shared type definitions for the development event tracker.
//!
//! This crate is the single source of truth for the types that cross the
//! store and HTTP boundaries. Stored events flow downstream to `TypeScript`
//! via `ts-rs` for the timeline UI.
//!
//! # Modules
//!
//! - [`ids`] -- The store-assigned [`EventId`]
//! - [`event`] -- Stored [`Event`] records and the unvalidated [`RawEvent`]
//! - [`filter`] -- The optional filter set accepted by retrieval

pub mod event;
pub mod filter;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use event::{Event, RawEvent};
pub use filter::EventFilter;
pub use ids::EventId;
