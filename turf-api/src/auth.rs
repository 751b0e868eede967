//! Scheduler Authentication
//!
//! The settlement trigger is invoked by an external scheduler carrying a
//! shared-secret bearer token. Player-facing endpoints are authenticated
//! upstream by the session layer and pass through untouched here.
//!
//! # Configuration
//!
//! - `TURF_AUTH_ENABLED`: enable/disable the check (default: false, for
//!   local development)
//! - `TURF_SCHEDULER_TOKEN`: the shared secret

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

/// Authentication configuration for the scheduler trigger
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Whether the trigger requires a token
    pub enabled: bool,
    /// Shared secret expected in `Authorization: Bearer <token>`
    pub scheduler_token: Option<String>,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let enabled = std::env::var("TURF_AUTH_ENABLED")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(false);
        let scheduler_token = std::env::var("TURF_SCHEDULER_TOKEN").ok().filter(|t| !t.is_empty());
        Self {
            enabled,
            scheduler_token,
        }
    }

    /// Validate a presented bearer token
    pub fn validate(&self, token: &str) -> bool {
        self.scheduler_token.as_deref() == Some(token)
    }
}

/// Unauthorized response body
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthErrorResponse {
    pub error: String,
    pub error_code: String,
    pub message: String,
}

impl AuthErrorResponse {
    pub fn unauthorized(message: &str) -> Self {
        Self {
            error: "Unauthorized".to_string(),
            error_code: "AUTH_UNAUTHORIZED".to_string(),
            message: message.to_string(),
        }
    }
}

/// Middleware guarding the scheduler job routes
pub async fn scheduler_auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let auth = &state.auth_config;
    if !auth.enabled {
        return next.run(request).await;
    }

    if let Some(header) = request.headers().get(AUTHORIZATION) {
        if let Ok(value) = header.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                if auth.validate(token) {
                    return next.run(request).await;
                }
                return unauthorized("Invalid scheduler token");
            }
        }
    }

    unauthorized("Scheduler token required. Provide Authorization: Bearer <token>")
}

fn unauthorized(message: &str) -> Response {
    tracing::warn!(message, "scheduler request rejected");
    (
        StatusCode::UNAUTHORIZED,
        Json(AuthErrorResponse::unauthorized(message)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_default_is_open() {
        let config = AuthConfig::default();
        assert!(!config.enabled);
        assert!(config.scheduler_token.is_none());
    }

    #[test]
    fn test_token_validation() {
        let config = AuthConfig {
            enabled: true,
            scheduler_token: Some("cron-secret".to_string()),
        };
        assert!(config.validate("cron-secret"));
        assert!(!config.validate("wrong"));
        assert!(!config.validate(""));
    }

    #[test]
    fn test_unconfigured_token_rejects_everything() {
        let config = AuthConfig {
            enabled: true,
            scheduler_token: None,
        };
        assert!(!config.validate("anything"));
    }

    #[test]
    fn test_auth_error_response() {
        let err = AuthErrorResponse::unauthorized("nope");
        assert_eq!(err.error, "Unauthorized");
        assert_eq!(err.error_code, "AUTH_UNAUTHORIZED");
    }
}
