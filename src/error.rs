// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Errors raised by the insight pipeline (aggregation, generation, caching).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InsightError {
    /// Malformed caller input, or model output that failed schema checks.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Generation API returned HTTP {status_code}: {message}")]
    Api { status_code: u16, message: String },

    /// Connection-level failure (DNS, TLS, reset) with no HTTP status.
    #[error("Generation API request failed: {0}")]
    Transport(String),

    #[error("Activity data access failed: {0}")]
    DataAccess(String),
}

impl InsightError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            InsightError::Timeout { .. } | InsightError::Transport(_) => true,
            InsightError::Api { status_code, .. } => is_retryable_status(*status_code),
            InsightError::Validation(_) | InsightError::DataAccess(_) => false,
        }
    }

    /// Short machine-readable name for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            InsightError::Validation(_) => "validation",
            InsightError::Timeout { .. } => "timeout",
            InsightError::Api { .. } => "api",
            InsightError::Transport(_) => "transport",
            InsightError::DataAccess(_) => "data_access",
        }
    }
}

/// Returns `true` for HTTP statuses worth retrying (429 and any 5xx).
pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..=599).contains(&status)
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Data access error: {0}")]
    DataAccess(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<InsightError> for AppError {
    fn from(err: InsightError) -> Self {
        match err {
            InsightError::Validation(msg) => AppError::BadRequest(msg),
            InsightError::DataAccess(msg) => AppError::DataAccess(msg),
            other => AppError::Internal(anyhow::anyhow!(other)),
        }
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
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::DataAccess(msg) => {
                tracing::error!(error = %msg, "Data access error");
                (StatusCode::SERVICE_UNAVAILABLE, "data_access_error", None)
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
