use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::super::error::ExecutionRouteError;
use super::super::types::{
    ApiResponse, ExecutionListResponse, ExecutionResponse, ExecutionRouteResult, OwnerScope, RecordId,
};
use crate::core::config::Config;
use crate::error::execution::ExecutionError;
use crate::types::execution::ExecutionStatus;
use crate::worker::event_handler::service::ExecutionHandlerService;

/// Lists the execution history for one evidence record, newest first.
#[instrument(skip(config), fields(evidence_id = %evidence_id))]
async fn handle_list_executions_for_evidence(
    Path(evidence_id): Path<String>,
    State(config): State<Arc<Config>>,
) -> ExecutionRouteResult {
    match config.database().get_executions_by_evidence_id(&evidence_id).await {
        Ok(executions) => {
            let executions: Vec<ExecutionResponse> = executions.into_iter().map(Into::into).collect();
            Ok(Json(ApiResponse::success_with_data(ExecutionListResponse { executions }, None)).into_response())
        }
        Err(e) => {
            error!(error = %e, "Failed to list executions for evidence");
            Err(ExecutionRouteError::DatabaseError)
        }
    }
}

/// Fetches a single execution record.
#[instrument(skip(config), fields(execution_id = %id))]
async fn handle_get_execution(
    Path(RecordId { id }): Path<RecordId>,
    State(config): State<Arc<Config>>,
) -> ExecutionRouteResult {
    let execution_id = Uuid::parse_str(&id).map_err(|_| ExecutionRouteError::InvalidId(id.clone()))?;

    match config.database().get_execution_by_id(execution_id).await {
        Ok(Some(execution)) => {
            Ok(Json(ApiResponse::success_with_data(ExecutionResponse::from(execution), None)).into_response())
        }
        Ok(None) => Err(ExecutionRouteError::NotFound(id)),
        Err(e) => {
            error!(error = %e, "Failed to fetch execution");
            Err(ExecutionRouteError::DatabaseError)
        }
    }
}

/// Cancels an execution; only `pending` and `running` records are cancellable.
#[instrument(skip(config), fields(execution_id = %id))]
async fn handle_cancel_execution(
    Path(RecordId { id }): Path<RecordId>,
    State(config): State<Arc<Config>>,
) -> ExecutionRouteResult {
    let execution_id = Uuid::parse_str(&id).map_err(|_| ExecutionRouteError::InvalidId(id.clone()))?;

    match ExecutionHandlerService::cancel_execution(execution_id, config).await {
        Ok(true) => {
            info!("Execution cancelled");
            Ok(Json(ApiResponse::success(Some(format!("Execution with id {} cancelled", id)))).into_response())
        }
        Ok(false) => Err(ExecutionRouteError::InvalidExecutionState(format!(
            "execution {} is not in a cancellable state",
            id
        ))),
        Err(ExecutionError::ExecutionNotFound { .. }) => Err(ExecutionRouteError::NotFound(id)),
        Err(e) => {
            error!(error = %e, "Failed to cancel execution");
            Err(ExecutionRouteError::ProcessingError(e.to_string()))
        }
    }
}

/// Retries a failed execution.
#[instrument(skip(config), fields(execution_id = %id))]
async fn handle_retry_execution(
    Path(RecordId { id }): Path<RecordId>,
    State(config): State<Arc<Config>>,
) -> ExecutionRouteResult {
    let execution_id = Uuid::parse_str(&id).map_err(|_| ExecutionRouteError::InvalidId(id.clone()))?;

    match ExecutionHandlerService::retry_execution(execution_id, config).await {
        Ok(true) => {
            info!("Execution retry initiated");
            Ok(Json(ApiResponse::success(Some(format!("Execution with id {} queued for retry", id)))).into_response())
        }
        Ok(false) => {
            Err(ExecutionRouteError::InvalidExecutionState(format!("execution {} is not in failed state", id)))
        }
        Err(ExecutionError::ExecutionNotFound { .. }) => Err(ExecutionRouteError::NotFound(id)),
        Err(e) => {
            error!(error = %e, "Failed to retry execution");
            Err(ExecutionRouteError::ProcessingError(e.to_string()))
        }
    }
}

/// Lists in-flight executions (`pending` or `running`) across the caller's
/// owned evidence.
#[instrument(skip(config), fields(status = %status))]
async fn handle_list_executions_by_status(
    Path(status): Path<String>,
    Query(OwnerScope { owner_id }): Query<OwnerScope>,
    State(config): State<Arc<Config>>,
) -> ExecutionRouteResult {
    let parsed_status =
        ExecutionStatus::from_str(&status).map_err(|_| ExecutionRouteError::InvalidStatus(status.clone()))?;
    if !matches!(parsed_status, ExecutionStatus::Pending | ExecutionStatus::Running) {
        return Err(ExecutionRouteError::InvalidStatus(status));
    }

    match config.database().get_executions_by_status_for_owner(parsed_status, &owner_id).await {
        Ok(executions) => {
            let executions: Vec<ExecutionResponse> = executions.into_iter().map(Into::into).collect();
            Ok(Json(ApiResponse::success_with_data(ExecutionListResponse { executions }, None)).into_response())
        }
        Err(e) => {
            error!(error = %e, "Failed to list executions by status");
            Err(ExecutionRouteError::DatabaseError)
        }
    }
}

/// Creates the router for execution management endpoints.
pub(crate) fn execution_router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/evidence/:evidence_id", get(handle_list_executions_for_evidence))
        .route("/status/:status", get(handle_list_executions_by_status))
        .route("/:id", get(handle_get_execution))
        .route("/:id/cancel", post(handle_cancel_execution))
        .route("/:id/retry", post(handle_retry_execution))
        .with_state(config)
}
