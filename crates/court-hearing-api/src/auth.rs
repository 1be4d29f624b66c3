//! Bearer token authentication for the hearing routes
//!
//! Tokens are HS256 JWTs taken from the `Authorization` header. A request
//! without a valid token is rejected with 401; a valid token lacking the
//! write role gets 403.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::handler::ApiError;

/// Claims read from an access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Calling client
    pub sub: String,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Spring-style authorities, accepted as roles
    #[serde(default)]
    pub authorities: Vec<String>,
    /// Expiry, seconds since the epoch
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().chain(&self.authorities).any(|r| r == role)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Invalid token scheme (expected Bearer)")]
    InvalidScheme,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing required role {0}")]
    MissingRole(String),
}

impl AuthError {
    /// Whether the caller is authenticated but not permitted
    pub fn is_forbidden(&self) -> bool {
        matches!(self, AuthError::MissingRole(_))
    }
}

/// Validates bearer tokens and checks for the write role
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    required_role: String,
}

impl JwtVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            required_role: config.required_role.clone(),
        }
    }

    /// Validate a raw token and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }

    /// Authenticate an `Authorization` header value and check the role
    pub fn authorize(&self, header: Option<&str>) -> Result<Claims, AuthError> {
        let header = header.ok_or(AuthError::MissingHeader)?;
        let (scheme, token) = header
            .trim()
            .split_once(' ')
            .ok_or(AuthError::InvalidScheme)?;
        if !scheme.eq_ignore_ascii_case("Bearer") {
            return Err(AuthError::InvalidScheme);
        }
        let token = token.trim();

        let claims = self.validate_token(token)?;
        if !claims.has_role(&self.required_role) {
            return Err(AuthError::MissingRole(self.required_role.clone()));
        }

        debug!(subject = %claims.sub, "Token authorized");
        Ok(claims)
    }
}

/// Middleware guarding routes that need the write role
pub async fn require_write_role(
    State(verifier): State<Arc<JwtVerifier>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if let Err(e) = verifier.authorize(header) {
        warn!(
            method = %request.method(),
            path = %request.uri().path(),
            error = %e,
            "Rejected request"
        );
        return Err(e.into());
    }

    Ok(next.run(request).await)
}
