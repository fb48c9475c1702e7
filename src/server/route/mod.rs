use crate::core::config::Config;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;
use executions::execution_router;
use health::health_router;
use std::sync::Arc;
use templates::template_router;

pub(super) mod executions;
pub(super) mod health;
pub(super) mod templates;

/// Fallback for unmatched routes.
pub async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "The requested resource was not found")
}

pub(crate) fn server_router(config: Arc<Config>) -> Router {
    Router::new()
        .merge(health_router())
        .nest("/executions", execution_router(config.clone()))
        .nest("/templates", template_router(config))
        .fallback(handler_404)
}
