//! Error types for the event store.
//!
//! All store operations return [`StoreError`]. The kinds are deliberately
//! coarse: the HTTP boundary maps each one to a status code and owns the
//! user-facing text.

/// SQLSTATE raised by `PostgreSQL` when a relation does not exist.
const UNDEFINED_TABLE: &str = "42P01";

/// Errors that can occur in the event store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An ingested event is missing a field or carries a malformed one.
    ///
    /// Raised before any storage access; the store is left untouched.
    #[error("validation error: {0}")]
    Validation(String),

    /// The persistence layer could not be reached or failed the operation.
    ///
    /// Never retried inside the store. The next call starts from scratch.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// `append` or `query` was called before the first `initialize`.
    #[error("event store is not initialized")]
    NotInitialized,

    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Build a [`StoreError::Validation`] from any displayable message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err
            && db.code().as_deref() == Some(UNDEFINED_TABLE)
        {
            return Self::NotInitialized;
        }
        Self::StorageUnavailable(err.to_string())
    }
}
