use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-mostly view of an evidence record.
///
/// The evidence collection is owned by the evidence-management service; this
/// orchestrator resolves records by id when consuming scan requests and writes
/// back exactly one field, `latest_execution_id`. Two concurrent workers can
/// both refresh the pointer; last write wins.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EvidenceItem {
    pub id: String,
    pub control_id: String,
    pub owner_id: String,
    /// Template assigned for automated collection, if any.
    #[serde(default, with = "crate::types::opt_uuid_1_as_binary")]
    pub template_id: Option<Uuid>,
    /// Cloud account the scan runs against.
    pub target_account_id: Option<String>,
    /// Weak pointer to the newest execution, refreshed by the worker.
    #[serde(default, with = "crate::types::opt_uuid_1_as_binary")]
    pub latest_execution_id: Option<Uuid>,
}
