use crate::cli::RunCmd;
use crate::core::client::database::mongodb::MongoDbClient;
use crate::core::client::database::DatabaseClient;
use crate::core::client::queue::sqs::SQS;
use crate::core::client::queue::QueueClient;
use crate::core::client::scanner::aws_config_rules::AwsConfigRulesApiFactory;
use crate::core::client::scanner::{ComplianceScanClient, ConfigRulesScanner};
use crate::types::params::{DatabaseArgs, QueueArgs, ScannerArgs, ServerParams};
use crate::types::queue::QueueControlConfig;
use crate::OrchestratorResult;

/// The app config, holding the clients every component reaches through.
///
/// It is built once at startup and shared behind an `Arc`; the trait-object
/// fields are what the tests swap for mocks.
pub struct Config {
    /// The management API bind parameters
    server_params: ServerParams,
    /// Consumption limits for the scan-request worker
    queue_control: QueueControlConfig,
    /// The database client
    database: Box<dyn DatabaseClient>,
    /// Queue client
    queue: Box<dyn QueueClient>,
    /// Compliance scanner client
    scanner: Box<dyn ComplianceScanClient>,
}

impl Config {
    /// Builds the production configuration from CLI arguments.
    pub async fn from_run_cmd(run_cmd: &RunCmd) -> OrchestratorResult<Self> {
        let aws_config = aws_config::from_env().load().await;

        let database_args = DatabaseArgs::try_from(run_cmd.clone())?;
        let queue_args = QueueArgs::try_from(run_cmd.clone())?;
        let scanner_args = ScannerArgs::try_from(run_cmd.clone())?;
        let server_params = ServerParams::from(run_cmd.clone());
        let queue_control = QueueControlConfig { max_message_count: run_cmd.worker_pool_size };

        let database = Box::new(MongoDbClient::new(&database_args).await?);
        let queue = Box::new(SQS::new(&aws_config, &queue_args));
        let scanner_factory = AwsConfigRulesApiFactory::from_args(&aws_config, &scanner_args);
        let scanner = Box::new(ConfigRulesScanner::new(Box::new(scanner_factory)));

        Ok(Self { server_params, queue_control, database, queue, scanner })
    }

    /// Assembles a config from pre-built clients; used by tests to inject
    /// mocks.
    pub fn new(
        server_params: ServerParams,
        queue_control: QueueControlConfig,
        database: Box<dyn DatabaseClient>,
        queue: Box<dyn QueueClient>,
        scanner: Box<dyn ComplianceScanClient>,
    ) -> Self {
        Self { server_params, queue_control, database, queue, scanner }
    }

    /// Returns the server config
    pub fn server_config(&self) -> &ServerParams {
        &self.server_params
    }

    pub fn queue_control(&self) -> &QueueControlConfig {
        &self.queue_control
    }

    /// Returns the database client
    pub fn database(&self) -> &dyn DatabaseClient {
        self.database.as_ref()
    }

    /// Returns the queue client
    pub fn queue(&self) -> &dyn QueueClient {
        self.queue.as_ref()
    }

    /// Returns the compliance scanner client
    pub fn scanner(&self) -> &dyn ComplianceScanClient {
        self.scanner.as_ref()
    }
}
