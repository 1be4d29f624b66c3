//! Court Hearing Event Receiver
//!
//! HTTP service that accepts hearing events from the case-management
//! platform, records telemetry for each one and relays qualifying events to
//! an SNS topic.
//!
//! # Endpoints
//!
//! - `POST /hearing/{id}` - hearing update
//! - `POST /hearing/{id}/result` - hearing result
//! - `DELETE /hearing/{id}/delete` - hearing deletion
//! - `GET /health` - liveness
//!
//! All hearing endpoints need a bearer token carrying
//! `ROLE_COURT_HEARING_EVENT_WRITE`.

pub mod auth;
pub mod config;
pub mod handler;
pub mod sns;
pub mod telemetry;

use axum::Router;
use court_hearing_core::{MessagePublisher, RelayEngine, TelemetryEmitter};
use std::sync::Arc;

use crate::auth::JwtVerifier;
use crate::config::AppConfig;
use crate::handler::{create_router, AppState};

/// Wire the router from configuration and the two outbound collaborators
pub fn build_app(
    config: &AppConfig,
    telemetry: Arc<dyn TelemetryEmitter>,
    publisher: Arc<dyn MessagePublisher>,
) -> Router {
    let engine = RelayEngine::new(config.relay.allow_list(), telemetry, publisher);
    let verifier = JwtVerifier::new(&config.auth);

    create_router(Arc::new(AppState::new(engine)), Arc::new(verifier))
}
