//! Axum router construction for the API.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled so the browser timeline can call the API cross-origin.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, options};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- plain-text banner
/// - `GET /init`, `POST /init` -- destructive re-initialization
/// - `POST /ingest` -- ingest one event
/// - `GET /events` -- query events
/// - `GET /health` -- store status
///
/// Unmatched paths get a JSON 404. CORS allows any origin, method and
/// header.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/init", get(handlers::init).post(handlers::init))
        .route(
            "/ingest",
            options(handlers::options_ok).post(handlers::ingest),
        )
        .route(
            "/events",
            options(handlers::options_ok).get(handlers::list_events),
        )
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
