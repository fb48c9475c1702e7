pub mod otel;

use crate::cli::RunCmd;
use crate::OrchestratorError;
pub use otel::OTELConfig;

/// DatabaseArgs - Arguments used to connect to the document store
#[derive(Debug, Clone)]
pub struct DatabaseArgs {
    pub connection_uri: String,
    pub database_name: String,
}

/// QueueArgs - Arguments used to resolve queue names
///
/// `queue_template` contains a `{}` placeholder replaced with the queue type,
/// e.g. `scan-orchestrator-{}-queue` becomes
/// `scan-orchestrator-scan_request-queue`.
#[derive(Debug, Clone)]
pub struct QueueArgs {
    pub queue_template: String,
}

/// ServerParams - Bind address for the management API
#[derive(Debug, Clone)]
pub struct ServerParams {
    pub host: String,
    pub port: u16,
}

/// ScannerArgs - Arguments for the cross-account compliance scanner
#[derive(Debug, Clone)]
pub struct ScannerArgs {
    /// Name of the delegated role assumed in each target account. The role is
    /// resolved as `arn:aws:iam::{account_id}:role/{scan_role_name}`.
    pub scan_role_name: String,
}

impl TryFrom<RunCmd> for DatabaseArgs {
    type Error = OrchestratorError;
    fn try_from(run_cmd: RunCmd) -> Result<Self, Self::Error> {
        if run_cmd.mongodb_connection_url.is_empty() {
            return Err(OrchestratorError::ConfigError("MongoDB connection URL is required".to_string()));
        }
        Ok(Self { connection_uri: run_cmd.mongodb_connection_url, database_name: run_cmd.database_name })
    }
}

impl TryFrom<RunCmd> for QueueArgs {
    type Error = OrchestratorError;
    fn try_from(run_cmd: RunCmd) -> Result<Self, Self::Error> {
        if !run_cmd.queue_template.contains("{}") {
            return Err(OrchestratorError::ConfigError(format!(
                "Queue template {:?} must contain a {{}} placeholder for the queue type",
                run_cmd.queue_template
            )));
        }
        Ok(Self { queue_template: run_cmd.queue_template })
    }
}

impl From<RunCmd> for ServerParams {
    fn from(run_cmd: RunCmd) -> Self {
        Self { host: run_cmd.server_host, port: run_cmd.server_port }
    }
}

impl TryFrom<RunCmd> for ScannerArgs {
    type Error = OrchestratorError;
    fn try_from(run_cmd: RunCmd) -> Result<Self, Self::Error> {
        if run_cmd.scan_role_name.is_empty() {
            return Err(OrchestratorError::ConfigError("Scan role name is required".to_string()));
        }
        Ok(Self { scan_role_name: run_cmd.scan_role_name })
    }
}
