//! Route definitions
//!
//! - POST /hearing/:id - hearing updated or confirmed
//! - POST /hearing/:id/result - hearing resulted
//! - DELETE /hearing/:id/delete - hearing deleted (recorded, not relayed)
//! - GET /health - liveness, no auth
//!
//! The path id is logged but never checked against the payload's hearing id.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use court_hearing_core::{EventKind, HearingEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{ApiError, AppState};
use crate::auth::{require_write_role, JwtVerifier};

/// Create the router; hearing routes require the write role
pub fn create_router(state: Arc<AppState>, verifier: Arc<JwtVerifier>) -> Router {
    let hearing_routes = Router::new()
        .route("/hearing/:id", post(post_event))
        .route("/hearing/:id/result", post(post_result_event))
        .route("/hearing/:id/delete", delete(delete_event))
        .route_layer(middleware::from_fn_with_state(verifier, require_write_role))
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .merge(hearing_routes)
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "UP".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /hearing/:id
pub async fn post_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<HearingEvent>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(event) = payload?;
    relay(&state, EventKind::Update, &id, &event).await
}

/// POST /hearing/:id/result
pub async fn post_result_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<HearingEvent>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(event) = payload?;
    relay(&state, EventKind::Result, &id, &event).await
}

/// DELETE /hearing/:id/delete
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    info!(path_id = %id, "Received hearing delete request");
    state.engine.handle_delete(&id);
    StatusCode::OK
}

async fn relay(
    state: &AppState,
    kind: EventKind,
    path_id: &str,
    event: &HearingEvent,
) -> Result<StatusCode, ApiError> {
    info!(
        hearing_id = %event.hearing().id,
        path_id = %path_id,
        kind = %kind,
        "Received hearing event"
    );

    event.validate()?;
    state.engine.handle(kind, event).await?;

    Ok(StatusCode::OK)
}
