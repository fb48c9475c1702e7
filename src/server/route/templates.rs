use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::super::error::TemplateRouteError;
use super::super::types::{
    ApiResponse, CreateTemplateRequest, RecordId, TemplateListResponse, TemplateListScope, TemplateResponse,
    TemplateRouteResult, UpdateTemplateRequest,
};
use crate::core::config::Config;
use crate::types::template::{ScanParameters, ScanTemplate, TemplateUpdates};

/// Creates a scan template.
///
/// The scan kind and parameters are validated here; an unknown kind or
/// parameters that do not match the kind's schema never reach storage.
#[instrument(skip(config, request), fields(template_name = %request.name))]
async fn handle_create_template(
    State(config): State<Arc<Config>>,
    Json(request): Json<CreateTemplateRequest>,
) -> TemplateRouteResult {
    let parameters = ScanParameters::from_parts(&request.scan_kind, request.parameters)
        .map_err(|e| TemplateRouteError::ValidationError(e.to_string()))?;
    let template = ScanTemplate::new(request.name, request.description, parameters)
        .map_err(|e| TemplateRouteError::ValidationError(e.to_string()))?;

    match config.database().create_template(template).await {
        Ok(template) => {
            info!(template_id = %template.id, "Created scan template");
            Ok(Json(ApiResponse::success_with_data(
                TemplateResponse::from(template),
                Some("Template created".to_string()),
            ))
            .into_response())
        }
        Err(e) => {
            error!(error = %e, "Failed to create template");
            Err(TemplateRouteError::DatabaseError)
        }
    }
}

/// Lists templates; `?active_only=true` restricts to active ones.
#[instrument(skip(config))]
async fn handle_list_templates(
    Query(scope): Query<TemplateListScope>,
    State(config): State<Arc<Config>>,
) -> TemplateRouteResult {
    match config.database().list_templates(scope.active_only).await {
        Ok(templates) => {
            let templates: Vec<TemplateResponse> = templates.into_iter().map(Into::into).collect();
            Ok(Json(ApiResponse::success_with_data(TemplateListResponse { templates }, None)).into_response())
        }
        Err(e) => {
            error!(error = %e, "Failed to list templates");
            Err(TemplateRouteError::DatabaseError)
        }
    }
}

#[instrument(skip(config), fields(template_id = %id))]
async fn handle_get_template(
    Path(RecordId { id }): Path<RecordId>,
    State(config): State<Arc<Config>>,
) -> TemplateRouteResult {
    let template_id = Uuid::parse_str(&id).map_err(|_| TemplateRouteError::InvalidId(id.clone()))?;

    match config.database().get_template_by_id(template_id).await {
        Ok(Some(template)) => {
            Ok(Json(ApiResponse::success_with_data(TemplateResponse::from(template), None)).into_response())
        }
        Ok(None) => Err(TemplateRouteError::NotFound(id)),
        Err(e) => {
            error!(error = %e, "Failed to fetch template");
            Err(TemplateRouteError::DatabaseError)
        }
    }
}

/// Updates a template's mutable fields. New parameters are validated against
/// the template's existing scan kind; the kind itself is immutable.
#[instrument(skip(config, request), fields(template_id = %id))]
async fn handle_update_template(
    Path(RecordId { id }): Path<RecordId>,
    State(config): State<Arc<Config>>,
    Json(request): Json<UpdateTemplateRequest>,
) -> TemplateRouteResult {
    let template_id = Uuid::parse_str(&id).map_err(|_| TemplateRouteError::InvalidId(id.clone()))?;

    let current = match config.database().get_template_by_id(template_id).await {
        Ok(Some(template)) => template,
        Ok(None) => return Err(TemplateRouteError::NotFound(id)),
        Err(e) => {
            error!(error = %e, "Failed to fetch template");
            return Err(TemplateRouteError::DatabaseError);
        }
    };

    let mut updates = TemplateUpdates::new();
    if let Some(description) = request.description {
        updates = updates.update_description(description);
    }
    if let Some(parameters) = request.parameters {
        let parameters = ScanParameters::decode_for_kind(current.scan_kind(), parameters)
            .map_err(|e| TemplateRouteError::ValidationError(e.to_string()))?;
        updates = updates.update_parameters(parameters);
    }

    match config.database().update_template(&current, updates.build()).await {
        Ok(template) => {
            info!("Updated scan template");
            Ok(Json(ApiResponse::success_with_data(
                TemplateResponse::from(template),
                Some("Template updated".to_string()),
            ))
            .into_response())
        }
        Err(e) => {
            error!(error = %e, "Failed to update template");
            Err(TemplateRouteError::DatabaseError)
        }
    }
}

/// Flips a template's `active` flag; templates are never hard-deleted.
async fn set_template_active(
    id: String,
    active: bool,
    config: Arc<Config>,
) -> TemplateRouteResult {
    let template_id = Uuid::parse_str(&id).map_err(|_| TemplateRouteError::InvalidId(id.clone()))?;

    let current = match config.database().get_template_by_id(template_id).await {
        Ok(Some(template)) => template,
        Ok(None) => return Err(TemplateRouteError::NotFound(id)),
        Err(e) => {
            error!(error = %e, "Failed to fetch template");
            return Err(TemplateRouteError::DatabaseError);
        }
    };

    match config.database().update_template(&current, TemplateUpdates::new().update_active(active).build()).await {
        Ok(template) => {
            info!(template_id = %template.id, active = active, "Updated template activation");
            let verb = if active { "activated" } else { "deactivated" };
            Ok(Json(ApiResponse::success(Some(format!("Template with id {} {}", id, verb)))).into_response())
        }
        Err(e) => {
            error!(error = %e, "Failed to update template activation");
            Err(TemplateRouteError::DatabaseError)
        }
    }
}

#[instrument(skip(config), fields(template_id = %id))]
async fn handle_activate_template(
    Path(RecordId { id }): Path<RecordId>,
    State(config): State<Arc<Config>>,
) -> TemplateRouteResult {
    set_template_active(id, true, config).await
}

#[instrument(skip(config), fields(template_id = %id))]
async fn handle_deactivate_template(
    Path(RecordId { id }): Path<RecordId>,
    State(config): State<Arc<Config>>,
) -> TemplateRouteResult {
    set_template_active(id, false, config).await
}

/// Creates the router for template management endpoints.
pub(crate) fn template_router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/", post(handle_create_template).get(handle_list_templates))
        .route("/:id", get(handle_get_template).patch(handle_update_template))
        .route("/:id/activate", post(handle_activate_template))
        .route("/:id/deactivate", post(handle_deactivate_template))
        .with_state(config)
}
