pub mod controller;
pub mod event_handler;
pub mod parser;
pub mod producer;
pub mod traits;

use controller::worker_controller::WorkerController;

use crate::core::config::Config;
use crate::OrchestratorResult;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Initializes the scan workers with the provided configuration
///
/// Starts all queue consumers in the background and returns the controller
/// for shutdown management.
pub fn initialize_worker(config: Arc<Config>) -> OrchestratorResult<WorkerController> {
    info!("Initializing scan workers");

    let controller = WorkerController::new(config, CancellationToken::new());
    controller.start().map_err(crate::OrchestratorError::EventSystemError)?;

    info!("Workers initialized and started successfully");
    Ok(controller)
}
