use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

async fn handle_health_check() -> impl IntoResponse {
    "ok"
}

pub(crate) fn health_router() -> Router {
    Router::new().route("/health", get(handle_health_check))
}
