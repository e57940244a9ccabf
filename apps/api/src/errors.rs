#![allow(dead_code)]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Error taxonomy at the orchestration boundary.
///
/// Callers see exactly one of: a complete result, `Cancelled`, or a single
/// human-readable `Validation`/`TransientService` message. Retry counts and
/// persistence-chain details never cross this boundary. `Clone` is required
/// because joined (deduplicated) callers all observe the same failure.
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Timeout / 429 / 5xx, surfaced only after internal retry exhaustion.
    #[error("Analysis service unavailable: {0}")]
    TransientService(String),

    /// Cooperative cancellation. Never retried, never logged as a failure.
    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Analysis(AnalysisError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Analysis(AnalysisError::TransientService(msg)) => {
                tracing::error!("Transient service error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "SERVICE_UNAVAILABLE",
                    "The analysis service is temporarily unavailable. Please try again.".to_string(),
                )
            }
            AppError::Analysis(AnalysisError::Cancelled) => (
                // Client closed request; nobody is usually listening anymore.
                StatusCode::from_u16(499).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                "CANCELLED",
                "The analysis was cancelled".to_string(),
            ),
            AppError::Analysis(AnalysisError::Internal(msg)) => {
                tracing::error!("Analysis internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
