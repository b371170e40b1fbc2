//! Error types for the API server.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use devtrack_db::StoreError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body is not a JSON object of the expected shape.
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The request body is valid JSON but not an object.
    #[error("request body must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// The query string could not be decoded.
    #[error("invalid query string: {0}")]
    InvalidQuery(#[from] QueryRejection),

    /// The event store rejected or failed the operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No route matches the request.
    #[error("not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// The HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson(_)
            | Self::NotAnObject(_)
            | Self::InvalidQuery(_)
            | Self::Store(StoreError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Store(StoreError::NotInitialized) => StatusCode::CONFLICT,
            Self::Store(StoreError::StorageUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(StoreError::Config(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Store(StoreError::NotInitialized) => {
                String::from("event store is not initialized; call /init first")
            }
            Self::Store(StoreError::StorageUnavailable(_)) => String::from("storage unavailable"),
            Self::Store(StoreError::Config(_)) => String::from("internal server error"),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = serde_json::json!({
            "error": self.message(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
