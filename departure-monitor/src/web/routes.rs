//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use super::dto::DeparturesResponse;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/departures", get(departures))
        .with_state(state)
}

/// Health check: healthy while updates succeed.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    if state.presenter.is_available(&state.current()) {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    }
}

/// Current departures for the monitored stop.
///
/// Stale data from the last good snapshot is still returned after a failed
/// update, with `available` set to false.
async fn departures(State(state): State<AppState>) -> impl IntoResponse {
    let current = state.current();
    let presenter = &state.presenter;

    let attributes = presenter.attributes(&current, Utc::now());
    let status = if attributes.is_some() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = DeparturesResponse {
        available: presenter.is_available(&current),
        summary: presenter.summary(&current),
        last_error: current.last_error.clone(),
        attributes,
    };

    (status, Json(body))
}
