use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::types::ApiResponse;

/// Errors returned by the execution management routes.
///
/// Status mapping: `InvalidId`/`InvalidStatus` -> 400, `NotFound` -> 404,
/// `InvalidExecutionState` -> 409, `ProcessingError` -> 400,
/// `DatabaseError` -> 500.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionRouteError {
    #[error("Invalid execution ID: {0}")]
    InvalidId(String),

    #[error("Execution not found: {0}")]
    NotFound(String),

    /// The execution is in a state that does not admit the requested
    /// operation (cancel on a terminal record, retry on a non-failed one).
    #[error("Invalid execution state: {0}")]
    InvalidExecutionState(String),

    #[error("Invalid status filter: {0}")]
    InvalidStatus(String),

    #[error("Execution processing error: {0}")]
    ProcessingError(String),

    #[error("Database error")]
    DatabaseError,
}

impl IntoResponse for ExecutionRouteError {
    fn into_response(self) -> Response {
        match self {
            ExecutionRouteError::InvalidId(id) => {
                (StatusCode::BAD_REQUEST, Json(ApiResponse::error(format!("Invalid execution ID: {}", id))))
                    .into_response()
            }
            ExecutionRouteError::NotFound(id) => {
                (StatusCode::NOT_FOUND, Json(ApiResponse::error(format!("Execution not found: {}", id))))
                    .into_response()
            }
            ExecutionRouteError::InvalidExecutionState(msg) => {
                (StatusCode::CONFLICT, Json(ApiResponse::error(format!("Invalid execution state: {}", msg))))
                    .into_response()
            }
            ExecutionRouteError::InvalidStatus(status) => {
                (StatusCode::BAD_REQUEST, Json(ApiResponse::error(format!("Invalid status filter: {}", status))))
                    .into_response()
            }
            ExecutionRouteError::ProcessingError(msg) => {
                (StatusCode::BAD_REQUEST, Json(ApiResponse::error(format!("Processing error: {}", msg))))
                    .into_response()
            }
            ExecutionRouteError::DatabaseError => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiResponse::error("Database error occurred".to_string())))
                    .into_response()
            }
        }
    }
}

/// Errors returned by the template management routes.
#[derive(Debug, thiserror::Error)]
pub enum TemplateRouteError {
    #[error("Invalid template ID: {0}")]
    InvalidId(String),

    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template validation error: {0}")]
    ValidationError(String),

    #[error("Database error")]
    DatabaseError,
}

impl IntoResponse for TemplateRouteError {
    fn into_response(self) -> Response {
        match self {
            TemplateRouteError::InvalidId(id) => {
                (StatusCode::BAD_REQUEST, Json(ApiResponse::error(format!("Invalid template ID: {}", id))))
                    .into_response()
            }
            TemplateRouteError::NotFound(id) => {
                (StatusCode::NOT_FOUND, Json(ApiResponse::error(format!("Template not found: {}", id))))
                    .into_response()
            }
            TemplateRouteError::ValidationError(msg) => {
                (StatusCode::BAD_REQUEST, Json(ApiResponse::error(format!("Validation error: {}", msg))))
                    .into_response()
            }
            TemplateRouteError::DatabaseError => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiResponse::error("Database error occurred".to_string())))
                    .into_response()
            }
        }
    }
}
