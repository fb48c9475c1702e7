pub mod config_rules;

use crate::core::config::Config;
use crate::error::execution::ExecutionError;
use crate::types::evidence::EvidenceItem;
use crate::types::scan::ScanOutput;
use crate::types::template::ScanParameters;
use async_trait::async_trait;
use std::sync::Arc;

/// One handler per scan kind.
///
/// The worker dispatch loop resolves a handler through the factory and never
/// matches on scan kinds itself, so new kinds only touch the factory and
/// their own handler module.
#[async_trait]
pub trait ScanKindHandler: Send + Sync {
    /// Runs the scan described by `parameters` against the evidence's target
    /// account and returns the typed result to store on the execution.
    async fn run_scan(
        &self,
        parameters: &ScanParameters,
        evidence: &EvidenceItem,
        config: Arc<Config>,
    ) -> Result<ScanOutput, ExecutionError>;
}
