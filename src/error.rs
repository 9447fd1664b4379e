// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;

/// Failure talking to a backing store (activity log or streak state).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Database not connected (offline mode)")]
    Offline,
}

/// Streak engine failures.
///
/// Every variant is recoverable: streak data never gates a critical
/// action, so callers retry or serve the last cached value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreakError {
    /// A validation-path read failed and there was no cached state to serve.
    #[error("transient read failure: {0}")]
    TransientRead(StoreError),

    /// A full recompute could not complete. Nothing was written.
    #[error("reconciliation failed: {0}")]
    Reconciliation(StoreError),
}

impl StreakError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            StreakError::TransientRead(_) | StreakError::Reconciliation(_) => true,
        }
    }

    pub fn store_error(&self) -> &StoreError {
        match self {
            StreakError::TransientRead(e) | StreakError::Reconciliation(e) => e,
        }
    }
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

    #[error("Streak temporarily unavailable: {0}")]
    Streak(#[from] StreakError),

    #[error("Database error: {0}")]
    Database(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Seconds clients should wait before retrying a recoverable failure.
const RETRY_AFTER_SECS: &str = "5";

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
            AppError::Streak(err) => {
                tracing::warn!(error = %err, "Streak unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, "streak_unavailable", None)
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
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

        if status == StatusCode::SERVICE_UNAVAILABLE {
            return (status, [(header::RETRY_AFTER, RETRY_AFTER_SECS)], Json(body)).into_response();
        }

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
