use crate::types::scan::ScanOutput;
use crate::types::template::ScanParameters;
use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::{chrono_datetime_as_bson_datetime, uuid_1_as_binary};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExecutionStatus {
    /// The execution has been recorded and is waiting for a worker
    Pending,
    /// A worker has claimed the execution and the scan is in flight
    Running,
    /// The scan finished and its result is stored
    Completed,
    /// The scan failed; terminal until a user invokes retry
    Failed,
    /// A user cancelled the execution; absorbing
    Cancelled,
}

impl ExecutionStatus {
    /// Transition table of the execution state machine.
    ///
    /// `completed` and `cancelled` are absorbing; `failed` leaves only through
    /// an explicit retry back to `pending`.
    pub fn can_transition_to(&self, next: ExecutionStatus) -> bool {
        use ExecutionStatus::*;
        matches!(
            (self, next),
            (Pending, Running) | (Pending, Cancelled) | (Running, Completed) | (Running, Failed) | (Running, Cancelled) | (Failed, Pending)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionStatus::Completed | ExecutionStatus::Failed | ExecutionStatus::Cancelled)
    }

    pub fn is_cancellable(&self) -> bool {
        matches!(self, ExecutionStatus::Pending | ExecutionStatus::Running)
    }
}

/// The persisted record of one attempt to run a template against a piece of
/// evidence.
///
/// Executions are created by the worker when it consumes a scan request and
/// mutated only by the worker or by explicit user action (cancel/retry). Many
/// executions can exist per evidence record over time; the evidence record
/// holds a weak latest-execution pointer that the worker refreshes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanExecution {
    #[serde(with = "uuid_1_as_binary")]
    pub id: Uuid,
    #[serde(with = "uuid_1_as_binary")]
    pub template_id: Uuid,
    pub evidence_id: String,
    pub status: ExecutionStatus,
    #[serde(default, with = "crate::types::opt_datetime_as_bson_datetime")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::types::opt_datetime_as_bson_datetime")]
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<ScanOutput>,
    pub error_message: Option<String>,
    pub retry_count: u32,
    pub executor_id: Option<String>,
    /// Snapshot of the template parameters the scan ran with; later template
    /// edits do not rewrite history.
    pub execution_config: ScanParameters,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl ScanExecution {
    pub fn new_pending(template_id: Uuid, evidence_id: String, execution_config: ScanParameters) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            template_id,
            evidence_id,
            status: ExecutionStatus::Pending,
            started_at: None,
            completed_at: None,
            result: None,
            error_message: None,
            retry_count: 0,
            executor_id: None,
            execution_config,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Changes to apply to an execution record; id, evidence linkage and creation
/// time are never touched. `updated_at` is always refreshed by the store.
///
/// `Some(None)` on the clearable fields means "unset".
#[derive(Debug, Default, Clone)]
pub struct ExecutionUpdates {
    pub status: Option<ExecutionStatus>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<ScanOutput>,
    pub error_message: Option<Option<String>>,
    pub executor_id: Option<Option<String>>,
    pub retry_count: Option<u32>,
}

impl ExecutionUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_status(mut self, status: ExecutionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn update_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self
    }

    pub fn update_completed_at(mut self, completed_at: DateTime<Utc>) -> Self {
        self.completed_at = Some(completed_at);
        self
    }

    pub fn update_result(mut self, result: ScanOutput) -> Self {
        self.result = Some(result);
        self
    }

    pub fn update_error_message(mut self, error_message: String) -> Self {
        self.error_message = Some(Some(error_message));
        self
    }

    pub fn clear_error_message(mut self) -> Self {
        self.error_message = Some(None);
        self
    }

    pub fn update_executor_id(mut self, executor_id: String) -> Self {
        self.executor_id = Some(Some(executor_id));
        self
    }

    pub fn clear_executor_id(mut self) -> Self {
        self.executor_id = Some(None);
        self
    }

    pub fn update_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = Some(retry_count);
        self
    }

    pub fn build(self) -> Self {
        self
    }
}
