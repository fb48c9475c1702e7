use clap::{Parser, Subcommand};
use url::Url;

#[derive(Parser, Debug)]
#[command(
    name = "scan-orchestrator",
    about = "Scan Orchestrator - automated compliance evidence collection",
    long_about = "The scan orchestrator consumes scan requests from the durable queue, runs the \
    configured compliance scans against customer cloud accounts and records each attempt as an \
    execution. It also serves the execution/template management API consumed by the evidence UI."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the orchestrator service (workers + management API)
    Run {
        #[command(flatten)]
        run_command: Box<RunCmd>,
    },
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct RunCmd {
    // ===== DATABASE =====
    /// MongoDB connection string
    #[arg(long, env = "SCAN_ORCHESTRATOR_MONGODB_CONNECTION_URL", default_value = "mongodb://localhost:27017")]
    pub mongodb_connection_url: String,

    /// Database holding templates, executions and evidence
    #[arg(long, env = "SCAN_ORCHESTRATOR_DATABASE_NAME", default_value = "scan_orchestrator")]
    pub database_name: String,

    // ===== QUEUE =====
    /// Queue name template; "{}" is replaced with the queue type
    #[arg(long, env = "SCAN_ORCHESTRATOR_QUEUE_TEMPLATE", default_value = "scan-orchestrator-{}-queue")]
    pub queue_template: String,

    /// Maximum messages one worker instance processes concurrently
    #[arg(long, env = "SCAN_ORCHESTRATOR_WORKER_POOL_SIZE", default_value_t = 10)]
    pub worker_pool_size: usize,

    // ===== SCANNER =====
    /// Delegated role assumed in target accounts for compliance scans
    #[arg(long, env = "SCAN_ORCHESTRATOR_SCAN_ROLE_NAME", default_value = "compliance-scan-access")]
    pub scan_role_name: String,

    // ===== SERVER =====
    /// Host the management API binds to
    #[arg(long, env = "SCAN_ORCHESTRATOR_HOST", default_value = "127.0.0.1")]
    pub server_host: String,

    /// Port the management API binds to
    #[arg(long, env = "SCAN_ORCHESTRATOR_PORT", default_value_t = 3000)]
    pub server_port: u16,

    // ===== INSTRUMENTATION =====
    /// OTLP collector endpoint; metrics export is skipped when unset
    #[arg(long, env = "SCAN_ORCHESTRATOR_OTEL_COLLECTOR_ENDPOINT")]
    pub otel_collector_endpoint: Option<Url>,

    /// Service name attached to exported metrics
    #[arg(long, env = "SCAN_ORCHESTRATOR_OTEL_SERVICE_NAME", default_value = "scan-orchestrator")]
    pub otel_service_name: String,
}
