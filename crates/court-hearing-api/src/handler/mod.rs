//! HTTP handlers for the hearing event receiver
//!
//! - `routes`: the hearing ingress routes and health check
//! - `ApiError`: maps validation, auth and relay failures to responses

pub mod routes;

pub use routes::{create_router, delete_event, health_check, post_event, post_result_event};

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use court_hearing_core::{RelayEngine, RelayError, ValidationErrors};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;

/// State shared by all hearing routes
pub struct AppState {
    pub engine: RelayEngine,
}

impl AppState {
    pub fn new(engine: RelayEngine) -> Self {
        Self { engine }
    }
}

/// Error body returned on failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    UnsupportedMediaType(String),
    ValidationFailed(ValidationErrors),
    Unauthorized(String),
    Forbidden(String),
    Relay(RelayError),
}

impl ApiError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            ApiError::ValidationFailed(_) => "VALIDATION_FAILED",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::Relay(e) => e.error_code(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Relay(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn to_error_info(&self) -> ErrorInfo {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::UnsupportedMediaType(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg) => ErrorInfo::new(self.error_code(), msg),
            ApiError::ValidationFailed(errors) => {
                ErrorInfo::new(self.error_code(), errors.to_string())
                    .with_details(serde_json::json!({ "errors": errors.errors }))
            }
            ApiError::Relay(e) => ErrorInfo::new(self.error_code(), e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Relay(e) = &self {
            tracing::error!(error = %e, code = self.error_code(), "Hearing event relay failed");
        }
        (self.status_code(), Json(self.to_error_info())).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::UnsupportedMediaType(rejection.body_text())
            }
            _ => ApiError::BadRequest(rejection.body_text()),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::ValidationFailed(errors)
    }
}

impl From<RelayError> for ApiError {
    fn from(error: RelayError) -> Self {
        ApiError::Relay(error)
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        if error.is_forbidden() {
            ApiError::Forbidden(error.to_string())
        } else {
            ApiError::Unauthorized(error.to_string())
        }
    }
}
