pub mod constant;
pub mod error;
pub mod mongodb;

use crate::types::evidence::EvidenceItem;
use crate::types::execution::{ExecutionStatus, ExecutionUpdates, ScanExecution};
use crate::types::template::{ScanTemplate, TemplateUpdates};
use async_trait::async_trait;
pub use error::DatabaseError;
use uuid::Uuid;

/// Trait defining database operations
///
/// Execution updates are conditional on the caller's view of the record's
/// status; a concurrent transition makes the update fail with
/// [`DatabaseError::UpdateFailed`] instead of silently overwriting an
/// absorbing state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    // --- templates ---

    /// create_template - Persist a new scan template
    async fn create_template(&self, template: ScanTemplate) -> Result<ScanTemplate, DatabaseError>;
    /// get_template_by_id - Get a template by its ID
    async fn get_template_by_id(&self, id: Uuid) -> Result<Option<ScanTemplate>, DatabaseError>;
    /// list_templates - List templates, optionally only active ones
    async fn list_templates(&self, only_active: bool) -> Result<Vec<ScanTemplate>, DatabaseError>;
    /// update_template - Apply updates to a template
    async fn update_template(
        &self,
        current: &ScanTemplate,
        update: TemplateUpdates,
    ) -> Result<ScanTemplate, DatabaseError>;

    // --- executions ---

    /// create_execution - Persist a new scan execution
    async fn create_execution(&self, execution: ScanExecution) -> Result<ScanExecution, DatabaseError>;
    /// get_execution_by_id - Get an execution by its ID
    async fn get_execution_by_id(&self, id: Uuid) -> Result<Option<ScanExecution>, DatabaseError>;
    /// update_execution - Apply updates, guarded by the expected current status
    async fn update_execution(
        &self,
        current: &ScanExecution,
        update: ExecutionUpdates,
    ) -> Result<ScanExecution, DatabaseError>;
    /// get_executions_by_evidence_id - Execution history for one evidence record, newest first
    async fn get_executions_by_evidence_id(&self, evidence_id: &str) -> Result<Vec<ScanExecution>, DatabaseError>;
    /// get_latest_pending_execution - Newest pending execution for an evidence record, if any
    async fn get_latest_pending_execution(&self, evidence_id: &str) -> Result<Option<ScanExecution>, DatabaseError>;
    /// get_executions_by_status_for_owner - Executions in a status across the owner's evidence
    async fn get_executions_by_status_for_owner(
        &self,
        status: ExecutionStatus,
        owner_id: &str,
    ) -> Result<Vec<ScanExecution>, DatabaseError>;
    /// delete_executions_by_evidence_id - Cascade used when evidence is deleted
    async fn delete_executions_by_evidence_id(&self, evidence_id: &str) -> Result<u64, DatabaseError>;

    // --- evidence (collaborator-owned) ---

    /// get_evidence_by_id - Resolve an evidence record
    async fn get_evidence_by_id(&self, evidence_id: &str) -> Result<Option<EvidenceItem>, DatabaseError>;
    /// create_evidence - Insert an evidence record (used by the evidence collaborator)
    async fn create_evidence(&self, evidence: EvidenceItem) -> Result<EvidenceItem, DatabaseError>;
    /// set_latest_execution - Refresh the evidence's latest-execution pointer (last write wins)
    async fn set_latest_execution(&self, evidence_id: &str, execution_id: Uuid) -> Result<(), DatabaseError>;
}
