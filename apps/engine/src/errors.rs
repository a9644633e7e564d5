use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::guardrails::GuardrailsError;
use crate::modes::ModeError;
use crate::recommendations::{RecommendationError, StoreError};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Guardrails error: {0}")]
    Guardrails(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<GuardrailsError> for AppError {
    fn from(err: GuardrailsError) -> Self {
        match err {
            GuardrailsError::Database(e) => AppError::Database(e),
            other => AppError::Guardrails(other.to_string()),
        }
    }
}

impl From<ModeError> for AppError {
    fn from(err: ModeError) -> Self {
        match err {
            ModeError::AgentDisabled { .. } => AppError::Conflict(err.to_string()),
            ModeError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(e) => AppError::Database(e),
            StoreError::Payload(e) => AppError::Internal(e.into()),
        }
    }
}

impl From<RecommendationError> for AppError {
    fn from(err: RecommendationError) -> Self {
        match err {
            RecommendationError::UnknownRecommendation { .. } => {
                AppError::NotFound(err.to_string())
            }
            RecommendationError::Guardrails(e) => e.into(),
            RecommendationError::Mode(e) => e.into(),
            RecommendationError::Store(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "AGENT_DISABLED", msg.clone()),
            AppError::Guardrails(msg) => {
                tracing::error!("Guardrails error: {msg}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "GUARDRAILS_ERROR",
                    msg.clone(),
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
