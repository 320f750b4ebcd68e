use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::render::RenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{message}")]
    Validation {
        message: String,
        details: Vec<String>,
    },

    #[error("File size exceeded the maximum limit")]
    PayloadTooLarge,

    #[error("AI generation failed: {0}")]
    Llm(#[from] LlmError),

    #[error("PDF rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Could not write output files: {0}")]
    Archive(#[from] std::io::Error),

    #[error("Could not read file {path}: {source}")]
    Download {
        path: String,
        source: std::io::Error,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(details: Vec<String>) -> Self {
        AppError::Validation {
            message: "Form validation failed. Please check your inputs.".to_string(),
            details,
        }
    }

    /// Message safe to show to the user, both in the JSON body and in progress toasts.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Internal(_) => "An unexpected error occurred. Please try again.".to_string(),
            AppError::PayloadTooLarge => {
                "File size exceeded the maximum limit (10MB)".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "LLM_ERROR")
            }
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "RENDER_ERROR")
            }
            AppError::Archive(e) => {
                tracing::error!("Archive error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "ARCHIVE_ERROR")
            }
            AppError::Download { path, source } => {
                tracing::error!("Failed to read {path}: {source}");
                (StatusCode::INTERNAL_SERVER_ERROR, "DOWNLOAD_ERROR")
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let mut error = json!({
            "code": code,
            "message": self.user_message(),
        });
        if let AppError::Validation { details, .. } = &self {
            error["details"] = json!(details);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
