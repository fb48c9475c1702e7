use clap::Parser as _;
use dotenvy::dotenv;
use scan_orchestrator::cli::{Cli, Commands, RunCmd};
use scan_orchestrator::core::config::Config;
use scan_orchestrator::server::setup_server;
use scan_orchestrator::types::params::OTELConfig;
use scan_orchestrator::utils::instrument::OrchestratorInstrumentation;
use scan_orchestrator::utils::logging::init_logging;
use scan_orchestrator::worker::initialize_worker;
use scan_orchestrator::{OrchestratorError, OrchestratorResult};
use std::sync::Arc;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();
    info!("Starting scan orchestrator");
    let cli = Cli::parse();

    match &cli.command {
        Commands::Run { run_command } => match run_orchestrator(run_command).await {
            Ok(_) => {
                info!("Scan orchestrator shut down cleanly");
            }
            Err(e) => {
                error!(
                    error = %e,
                    error_chain = ?e,
                    "Failed to run scan orchestrator"
                );
                panic!("Failed to run scan orchestrator: {}", e);
            }
        },
    }
}

async fn run_orchestrator(run_cmd: &RunCmd) -> OrchestratorResult<()> {
    let otel_config = OTELConfig::from(run_cmd);
    let instrumentation = OrchestratorInstrumentation::new(&otel_config)?;
    info!("Starting orchestrator service");

    let config = Arc::new(Config::from_run_cmd(run_cmd).await?);
    debug!("Configuration initialized");

    // Management API in its own task
    let (_, server_handle) = setup_server(config.clone()).await?;
    debug!("Application router initialized");

    // Queue consumers in the background; keep the controller for shutdown
    let worker_controller = initialize_worker(config.clone())?;

    tokio::signal::ctrl_c().await.expect("Failed to listen for ctrl+c");

    // Graceful shutdown: workers drain in-flight scans, then the server stops
    worker_controller.shutdown().await.map_err(OrchestratorError::EventSystemError)?;
    server_handle.shutdown().await.map_err(|e| OrchestratorError::RunCommandError(e.to_string()))?;

    instrumentation.shutdown()?;
    info!("Orchestrator service shutting down");
    Ok(())
}
