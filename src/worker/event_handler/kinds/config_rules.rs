use crate::core::config::Config;
use crate::error::execution::ExecutionError;
use crate::error::other::OtherError;
use crate::types::evidence::EvidenceItem;
use crate::types::scan::ScanOutput;
use crate::types::template::ScanParameters;
use crate::utils::metrics::ORCHESTRATOR_METRICS;
use crate::worker::event_handler::kinds::ScanKindHandler;
use async_trait::async_trait;
use color_eyre::eyre::eyre;
use opentelemetry::KeyValue;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub struct ConfigRulesScanHandler;

#[async_trait]
impl ScanKindHandler for ConfigRulesScanHandler {
    async fn run_scan(
        &self,
        parameters: &ScanParameters,
        evidence: &EvidenceItem,
        config: Arc<Config>,
    ) -> Result<ScanOutput, ExecutionError> {
        let ScanParameters::ConfigRules(params) = parameters;
        let account_id = evidence.target_account_id.as_deref().ok_or_else(|| {
            // The worker checks this before dispatching; reaching here means
            // the evidence record changed mid-flight.
            ExecutionError::Other(OtherError::from(eyre!(
                "evidence {} lost its target account before dispatch",
                evidence.id
            )))
        })?;

        let start = Instant::now();
        let summary = config.scanner().scan(account_id, &params.region, &params.rule_prefixes).await?;

        let attributes = [KeyValue::new("scan_kind", "config_rules")];
        ORCHESTRATOR_METRICS.scan_duration.record(start.elapsed().as_secs_f64(), &attributes);
        ORCHESTRATOR_METRICS.rules_evaluated.add(summary.rules_scanned.len() as u64, &attributes);

        info!(
            evidence_id = %evidence.id,
            account_id = %account_id,
            region = %params.region,
            rules_scanned = summary.rules_scanned.len(),
            non_compliant = summary.counts.non_compliant,
            "Configuration-rule scan finished"
        );
        Ok(ScanOutput::ConfigRules(summary))
    }
}
