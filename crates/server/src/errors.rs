use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Embedding service error: {0}")]
    EmbeddingError(String),

    #[error("LLM service error: {0}")]
    LlmError(String),

    #[error("Vector store error: {0}")]
    VectorStoreError(String),

    #[error("Classifier error: {0}")]
    ClassifierError(String),

    #[error("Initialization error: {0}")]
    InitError(String),

    #[error("Invalid request: {0}")]
    ValidationError(String),
}

impl AppError {
    pub fn http_status_code(&self) -> StatusCode {
        match self {
            AppError::EmbeddingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::LlmError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::VectorStoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ClassifierError(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InitError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::EmbeddingError(_) => true,
            AppError::LlmError(_) => true,
            AppError::VectorStoreError(_) => true,
            AppError::ClassifierError(_) => false,
            AppError::InitError(_) => false,
            AppError::ValidationError(_) => false,
        }
    }

    /// The error text clients see. Validation messages pass through
    /// verbatim, internal failures are wrapped.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg) => msg.clone(),
            AppError::InitError(msg) => msg.clone(),
            AppError::ClassifierError(msg) => msg.clone(),
            AppError::EmbeddingError(msg)
            | AppError::LlmError(msg)
            | AppError::VectorStoreError(msg) => format!("An error occurred: {}", msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.http_status_code();
        let body = Json(json!({"error": self.public_message()}));
        (status, body).into_response()
    }
}
