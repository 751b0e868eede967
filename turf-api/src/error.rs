//! API Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use turf_store::StoreError;

/// API-layer errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failure
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    /// Resource lookup failure
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: String },

    /// Internal error
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// Store error (business rules map to specific status codes)
    #[error("Store error: {0}")]
    StoreError(#[from] turf_store::StoreError),

    /// Engine error
    #[error("Engine error: {0}")]
    EngineError(#[from] turf_engine::EngineError),

    /// Domain validation error
    #[error("Validation error: {0}")]
    CoreError(#[from] turf_core::CoreError),
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Error code
    pub code: String,
    /// Error message
    pub message: String,
}

impl ApiError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::StoreError(err) => match err {
                StoreError::AlreadyContesting { .. } => StatusCode::CONFLICT,
                StoreError::InsufficientFunds { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                StoreError::TileNotFound { .. } | StoreError::AthleteNotFound { .. } => {
                    StatusCode::NOT_FOUND
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::EngineError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::CoreError(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Stable error code string for clients
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
            ApiError::StoreError(err) => match err {
                StoreError::AlreadyContesting { .. } => "ALREADY_CONTESTING",
                StoreError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
                StoreError::TileNotFound { .. } => "TILE_NOT_FOUND",
                StoreError::AthleteNotFound { .. } => "ATHLETE_NOT_FOUND",
                _ => "STORE_ERROR",
            },
            ApiError::EngineError(_) => "ENGINE_ERROR",
            ApiError::CoreError(_) => "VALIDATION_ERROR",
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        ApiError::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal {
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_rule_status_mapping() {
        let err = ApiError::from(StoreError::AlreadyContesting {
            tile_id: "1:1".to_string(),
            guild_id: "guild:a".to_string(),
            period: "2025-W42".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), "ALREADY_CONTESTING");

        let err = ApiError::from(StoreError::InsufficientFunds {
            required: 50,
            available: 10,
        });
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error_code(), "INSUFFICIENT_FUNDS");

        let err = ApiError::from(StoreError::TileNotFound {
            tile_id: "1:1".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_errors_are_bad_requests() {
        let err = ApiError::from(turf_core::CoreError::NegativeMetrics { volume: -1, xp: 0 });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = ApiError::validation("bad bbox");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_not_found_helper() {
        let err = ApiError::not_found("Athlete", "athlete:9");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
