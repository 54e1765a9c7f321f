//! Application error handling
//!
//! This module provides unified error handling for the API. Every failure
//! that reaches a handler boundary is converted to the uniform envelope
//! `{"success": false, "message": ..., "errors"?: [...]}` with the proper
//! status code. Internal causes are logged, never serialized.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use smart_school_shared::types::{ErrorBody, FieldError};
use thiserror::Error;
use tracing::error;

/// API error type that can be converted to HTTP responses
///
/// The 401 variants deliberately carry fixed messages: login failures do not
/// reveal whether the email exists, while token failures stay
/// distinguishable (missing vs expired vs invalid).
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Current password is incorrect")]
    InvalidCurrentPassword,

    #[error("Account is not active")]
    AccountNotActive,

    #[error("No token provided. Authorization denied.")]
    Unauthenticated,

    #[error("Token expired. Please login again.")]
    TokenExpired,

    #[error("Invalid token. Authorization denied.")]
    InvalidToken,

    #[error("Access denied. Insufficient permissions.")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateEmail => StatusCode::CONFLICT,
            ApiError::InvalidCredentials
            | ApiError::InvalidCurrentPassword
            | ApiError::AccountNotActive
            | ApiError::Unauthenticated
            | ApiError::TokenExpired
            | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            ApiError::Validation(errors) => ErrorBody::with_errors("Validation failed", errors),
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                ErrorBody::new("An internal error occurred")
            }
            ApiError::Database(err) => {
                error!("Database error: {:?}", err);
                ErrorBody::new("An internal error occurred")
            }
            other => ErrorBody::new(other.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_status() {
        let error = ApiError::Validation(vec![FieldError {
            field: "email".to_string(),
            message: "Valid email is required".to_string(),
        }]);
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_duplicate_email_is_conflict() {
        let response = ApiError::DuplicateEmail.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_credential_failures_are_unauthorized() {
        for error in [
            ApiError::InvalidCredentials,
            ApiError::AccountNotActive,
            ApiError::TokenExpired,
            ApiError::InvalidToken,
            ApiError::Unauthenticated,
        ] {
            let response = error.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_forbidden_status() {
        let response = ApiError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_envelope_shape() {
        let response = ApiError::InvalidCredentials.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Invalid credentials");
        assert!(json.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_does_not_leak() {
        let error = ApiError::Internal(anyhow::anyhow!("connection string with password"));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!body.contains("password"));
    }
}
