// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-desk Authors

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::models::member::GuardViolation;
use crate::services::auth::AuthError;
use crate::validation::ValidationError;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired session")]
    InvalidToken,

    #[error("Credenciales incorrectas")]
    InvalidCredentials,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// A form step failed one of its rules. Recoverable, the caller re-prompts.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Attempted status change is not in the transition table.
    #[error(transparent)]
    GuardViolation(#[from] GuardViolation),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Datastore read/write/upload failure. Retryable.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::Provider(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl AppError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Storage(_))
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut field = None;
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                Some(self.to_string()),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Validation(err) => {
                field = Some(err.field);
                (
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    Some(err.reason.clone()),
                )
            }
            AppError::GuardViolation(violation) => (
                StatusCode::CONFLICT,
                "guard_violation",
                Some(violation.to_string()),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", Some(msg.clone())),
            AppError::Storage(msg) => {
                tracing::error!(error = %msg, "Storage error");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "storage_error",
                    Some("The datastore is unavailable, please retry".to_string()),
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
            field,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
