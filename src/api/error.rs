//! API error type mapping to HTTP status codes and `{"error": ...}` bodies.

use crate::core::llm::GenerationError;
use crate::storage::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown id and unreadable record look the same from outside.
    #[error("Chat not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("storage failure: {0}")]
    Storage(String),

    #[error("{0}")]
    Generation(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => ApiError::NotFound,
            other => ApiError::Storage(other.to_string()),
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(e: GenerationError) -> Self {
        ApiError::Generation(e.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) | ApiError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Storage(detail) => {
                tracing::error!(error = %detail, "Chat storage failure");
                "Failed to access chat storage".to_string()
            }
            ApiError::Generation(detail) => {
                tracing::error!(error = %detail, "Text generation failed");
                detail.clone()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
