//! Centralized API error handling for DealBridge
//!
//! Every service returns [`ApiError`]; the HTTP layer turns it into a status
//! code and a JSON error body.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// API error type with HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Email already registered")]
    DuplicateIdentity,

    #[error("Invalid credentials")]
    AuthenticationFailed,

    #[error("Invalid or missing session token")]
    Unauthenticated,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid deal state: {0}")]
    InvalidState(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// JSON error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// Error details in the response
#[derive(Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

impl ApiError {
    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::DuplicateIdentity => "DUPLICATE_IDENTITY",
            ApiError::AuthenticationFailed => "AUTHENTICATION_FAILED",
            ApiError::Unauthenticated => "UNAUTHENTICATED",
            ApiError::AccessDenied(_) => "ACCESS_DENIED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InvalidState(_) => "INVALID_STATE",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Duplicate registration reuses 400 rather than 409
            ApiError::InvalidInput(_) | ApiError::DuplicateIdentity => StatusCode::BAD_REQUEST,
            ApiError::AuthenticationFailed | ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::AccessDenied(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidState(_) => StatusCode::CONFLICT,
            ApiError::DatabaseError(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn deal_not_found() -> Self {
        ApiError::NotFound("Deal".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(error = %message, code = %error_code, "Server error occurred");
        } else {
            tracing::debug!(error = %message, code = %error_code, "Client error occurred");
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code: error_code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

// Convenience conversions from common error types

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => ApiError::DuplicateIdentity,
            StoreError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

/// Result type alias using ApiError
pub type ApiResult<T> = Result<T, ApiError>;
