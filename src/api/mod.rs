//! Read-only REST API for the space weather monitor.
//!
//! Stateless over the files the scheduler writes: every handler re-reads
//! `checker-state.json` / `predictions.json` per request rather than
//! sharing in-memory state with the tick loop (spec.md §6).

pub mod envelope;
mod handlers;
mod routes;
pub mod state;

pub use state::ApiState;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the full application router.
pub fn create_app(state: ApiState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
