//! Error types for the server binary.
//!
//! [`DevtrackError`] is the top-level error type that wraps all possible
//! failure modes during startup and serving.

/// Top-level error for the server binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum DevtrackError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// Connecting to or initializing the event store failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: devtrack_db::StoreError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: devtrack_api::ServerError,
    },
}
