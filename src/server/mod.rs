pub mod error;
pub mod route;
pub mod types;

use crate::core::config::Config;
use crate::types::params::ServerParams;
use crate::{server::route::server_router, OrchestratorResult};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use error::{ExecutionRouteError, TemplateRouteError};

/// Handle for managing the HTTP server lifecycle.
pub struct ServerHandle {
    shutdown_token: CancellationToken,
    task_handle: JoinHandle<()>,
}

impl ServerHandle {
    /// Initiates graceful shutdown and waits for in-flight requests to finish.
    pub async fn shutdown(self) -> Result<(), tokio::task::JoinError> {
        info!("Initiating server graceful shutdown");
        self.shutdown_token.cancel();
        self.task_handle.await
    }
}

/// Sets up and starts the HTTP server with configured routes.
pub async fn setup_server(config: Arc<Config>) -> OrchestratorResult<(SocketAddr, ServerHandle)> {
    let (api_server_url, listener) = get_server_url(config.server_config()).await;

    let shutdown_token = CancellationToken::new();
    let server_token = shutdown_token.clone();

    let app = server_router(config.clone());
    let task_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(server_token.cancelled_owned())
            .await
            .expect("Failed to start axum server")
    });

    info!(address = %api_server_url, "Management API listening");
    let handle = ServerHandle { shutdown_token, task_handle };

    Ok((api_server_url, handle))
}

pub(crate) async fn get_server_url(server_params: &ServerParams) -> (SocketAddr, tokio::net::TcpListener) {
    // Port 0 in tests lets the OS pick a free port
    let port = if cfg!(test) { 0 } else { server_params.port };

    let address = format!("{}:{}", server_params.host, port);
    let listener = tokio::net::TcpListener::bind(address.clone()).await.expect("Failed to get listener");
    let api_server_url = listener.local_addr().expect("Unable to bind address to listener.");

    (api_server_url, listener)
}
