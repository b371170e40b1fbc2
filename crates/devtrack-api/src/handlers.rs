//! REST endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Plain-text banner |
//! | `GET`/`POST` | `/init` | Drop and recreate the events table |
//! | `POST` | `/ingest` | Store one event |
//! | `GET` | `/events` | Query events (`source`, `event_type`, `q`) |
//! | `GET` | `/health` | Store status |
//! | `OPTIONS` | `/ingest`, `/events` | Bare preflight acknowledgment |

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::Uri;
use axum::response::IntoResponse;
use devtrack_db::validate::json_kind;
use devtrack_types::{EventFilter, EventId, RawEvent};
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

/// Banner served at `GET /`.
pub const BANNER: &str = "Development Event Tracker API";

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /events` endpoint.
///
/// Blank values are treated as absent.
#[derive(Debug, Default, serde::Deserialize)]
pub struct EventsQuery {
    /// Exact source match.
    pub source: Option<String>,
    /// Exact event type match.
    pub event_type: Option<String>,
    /// Case-insensitive free-text search over the payload.
    pub q: Option<String>,
}

impl From<EventsQuery> for EventFilter {
    fn from(params: EventsQuery) -> Self {
        Self {
            source: params.source,
            event_type: params.event_type,
            query: params.q,
        }
    }
}

/// Acknowledgment for `/init` and bare `OPTIONS` requests.
#[derive(Debug, serde::Serialize)]
struct StatusResponse {
    status: &'static str,
}

/// Acknowledgment for `POST /ingest`.
#[derive(Debug, serde::Serialize)]
struct IngestResponse {
    status: &'static str,
    id: EventId,
}

/// Body of `GET /health`.
#[derive(Debug, serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: &'static str,
    initialized: bool,
    events: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Serve the plain-text banner.
pub async fn index() -> &'static str {
    BANNER
}

/// Drop and recreate the events table.
///
/// Destructive: every stored event is discarded and ids restart at 1.
pub async fn init(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    state.store.initialize().await?;
    Ok(Json(StatusResponse {
        status: "initialized",
    }))
}

/// Ingest a single event.
///
/// The body is parsed as JSON regardless of `Content-Type`, since hook
/// scripts frequently omit the header. It must be a JSON object.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let body: Value = serde_json::from_slice(&body)?;
    if !body.is_object() {
        return Err(ApiError::NotAnObject(json_kind(&body)));
    }
    let raw: RawEvent = serde_json::from_value(body)?;
    let id = state.store.append(raw).await?;

    Ok(Json(IngestResponse {
        status: "ingested",
        id,
    }))
}

/// List events matching the query parameters, newest first.
///
/// An empty match set is an empty array, not an error.
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    params: Result<Query<EventsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params?;
    let filter = EventFilter::from(params);
    let events = state.store.query(&filter).await?;
    Ok(Json(events))
}

/// Report store status.
pub async fn health(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let status = state.store.status().await?;
    Ok(Json(HealthResponse {
        status: "ok",
        backend: state.store.backend().name(),
        initialized: status.initialized,
        events: status.events,
    }))
}

/// Acknowledge an `OPTIONS` request that is not a CORS preflight.
///
/// Real preflights are answered by the CORS layer before routing.
pub async fn options_ok() -> impl IntoResponse {
    Json(StatusResponse { status: "ok" })
}

/// Fallback for unmatched routes.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_query_maps_q_to_free_text() {
        let params = EventsQuery {
            source: Some(String::from("Shell")),
            event_type: None,
            q: Some(String::from("database")),
        };
        let filter = EventFilter::from(params);
        assert_eq!(filter.source.as_deref(), Some("Shell"));
        assert_eq!(filter.event_type, None);
        assert_eq!(filter.query.as_deref(), Some("database"));
    }
}
