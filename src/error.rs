// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Rejected locally, before any request leaves the process.
    #[error("{0}")]
    Validation(String),

    /// Camera or geolocation access was refused or is unavailable.
    #[error("{0}")]
    Permission(String),

    #[error("Backend error: {0}")]
    Backend(String),

    /// The backend refused the request with a 4xx and a `{detail}` body.
    #[error("{detail}")]
    Rejected { status: u16, detail: String },

    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("{0}")]
    Geocoding(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message used by the report page whenever validation cannot complete.
    pub const VALIDATION_FAILED: &'static str =
        "Failed to validate waste report. Please try again.";

    /// True for errors raised before contacting the backend.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::Permission(_)
        )
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", Some(msg.clone()))
            }
            AppError::Permission(msg) => {
                (StatusCode::FORBIDDEN, "permission_denied", Some(msg.clone()))
            }
            AppError::Backend(msg) => {
                (StatusCode::BAD_GATEWAY, "backend_error", Some(msg.clone()))
            }
            AppError::Rejected { status, detail } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST),
                "rejected",
                Some(detail.clone()),
            ),
            AppError::MalformedResponse(msg) => {
                tracing::warn!(error = %msg, "Malformed backend response");
                (StatusCode::BAD_GATEWAY, "malformed_response", Some(msg.clone()))
            }
            AppError::Geocoding(msg) => {
                (StatusCode::BAD_GATEWAY, "geocoding_error", Some(msg.clone()))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
