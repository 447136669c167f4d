//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed (missing bucket, bad window spec)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Recording a sample failed
    #[error("Record error: {0}")]
    Record(#[from] crate::recorder::RecordError),

    /// Windowed query failed
    #[error("Query error: {0}")]
    Query(#[from] crate::query::QueryError),

    /// Publishing the chart artifact failed
    #[error("Publish error: {0}")]
    Publish(#[from] crate::artifact::PublishError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Record(_) => (StatusCode::INTERNAL_SERVER_ERROR, "RECORD_ERROR"),
            ApiError::Query(_) => (StatusCode::INTERNAL_SERVER_ERROR, "QUERY_ERROR"),
            ApiError::Publish(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PUBLISH_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        };

        let request_id = uuid::Uuid::new_v4().to_string();

        // Log the error
        tracing::error!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "API error occurred"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
