use crate::core::client::database::MockDatabaseClient;
use crate::core::client::queue::MockQueueClient;
use crate::core::client::scanner::MockComplianceScanClient;
use crate::core::config::Config;
use crate::types::evidence::EvidenceItem;
use crate::types::execution::{ExecutionStatus, ExecutionUpdates, ScanExecution};
use crate::types::params::ServerParams;
use crate::types::queue::QueueControlConfig;
use crate::types::scan::{ComplianceOutcome, ComplianceSummary};
use crate::types::template::{ConfigRuleScanParams, ScanParameters, ScanTemplate};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Assembles a [`Config`] backed by mock clients.
///
/// Defaults are fresh mocks with no expectations, so any unexpected client
/// call fails the test loudly.
pub struct TestConfigBuilder {
    database: MockDatabaseClient,
    queue: MockQueueClient,
    scanner: MockComplianceScanClient,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            database: MockDatabaseClient::new(),
            queue: MockQueueClient::new(),
            scanner: MockComplianceScanClient::new(),
        }
    }

    pub fn with_database(mut self, database: MockDatabaseClient) -> Self {
        self.database = database;
        self
    }

    pub fn with_queue(mut self, queue: MockQueueClient) -> Self {
        self.queue = queue;
        self
    }

    pub fn with_scanner(mut self, scanner: MockComplianceScanClient) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn build(self) -> Arc<Config> {
        Arc::new(Config::new(
            ServerParams { host: "127.0.0.1".to_string(), port: 0 },
            QueueControlConfig::default(),
            Box::new(self.database),
            Box::new(self.queue),
            Box::new(self.scanner),
        ))
    }
}

pub fn config_rule_params() -> ScanParameters {
    ScanParameters::ConfigRules(ConfigRuleScanParams {
        rule_prefixes: vec!["s3-bucket-".to_string()],
        region: "us-east-1".to_string(),
    })
}

pub fn build_template(active: bool) -> ScanTemplate {
    let mut template =
        ScanTemplate::new("S3 baseline".to_string(), "Bucket hygiene checks".to_string(), config_rule_params())
            .unwrap();
    template.active = active;
    template
}

pub fn build_evidence(evidence_id: &str, template_id: Option<Uuid>, target_account_id: Option<&str>) -> EvidenceItem {
    EvidenceItem {
        id: evidence_id.to_string(),
        control_id: "ctl-1".to_string(),
        owner_id: "user-1".to_string(),
        template_id,
        target_account_id: target_account_id.map(str::to_string),
        latest_execution_id: None,
    }
}

pub fn build_execution(evidence_id: &str, status: ExecutionStatus) -> ScanExecution {
    let mut execution = ScanExecution::new_pending(Uuid::new_v4(), evidence_id.to_string(), config_rule_params());
    execution.status = status;
    if status != ExecutionStatus::Pending {
        execution.started_at = Some(Utc::now());
        execution.executor_id = Some("scan-worker-test".to_string());
    }
    if status == ExecutionStatus::Failed {
        execution.error_message = Some("scan failed".to_string());
        execution.completed_at = Some(Utc::now());
    }
    execution
}

pub fn build_summary(outcomes: &[(&str, ComplianceOutcome)]) -> ComplianceSummary {
    let map: BTreeMap<String, ComplianceOutcome> =
        outcomes.iter().map(|(name, outcome)| (name.to_string(), *outcome)).collect();
    ComplianceSummary::from_rule_outcomes(map)
}

/// Mirrors the store's update semantics so mock `update_execution`
/// expectations can hand back realistic records.
pub fn apply_updates(current: &ScanExecution, update: &ExecutionUpdates) -> ScanExecution {
    let mut updated = current.clone();
    if let Some(status) = update.status {
        updated.status = status;
    }
    if let Some(started_at) = update.started_at {
        updated.started_at = Some(started_at);
    }
    if let Some(completed_at) = update.completed_at {
        updated.completed_at = Some(completed_at);
    }
    if let Some(ref result) = update.result {
        updated.result = Some(result.clone());
    }
    match &update.error_message {
        Some(Some(message)) => updated.error_message = Some(message.clone()),
        Some(None) => updated.error_message = None,
        None => {}
    }
    match &update.executor_id {
        Some(Some(executor_id)) => updated.executor_id = Some(executor_id.clone()),
        Some(None) => updated.executor_id = None,
        None => {}
    }
    if let Some(retry_count) = update.retry_count {
        updated.retry_count = retry_count;
    }
    updated.updated_at = Utc::now();
    updated
}
