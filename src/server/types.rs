use crate::types::execution::{ExecutionStatus, ScanExecution};
use crate::types::scan::ScanOutput;
use crate::types::template::{ScanKind, ScanParameters, ScanTemplate};
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{ExecutionRouteError, TemplateRouteError};

/// Path parameter carrying a record id.
#[derive(Deserialize)]
pub struct RecordId {
    pub id: String,
}

/// Query parameter scoping a listing to the caller's owned evidence.
#[derive(Deserialize)]
pub struct OwnerScope {
    pub owner_id: String,
}

/// Query parameter for template listings.
#[derive(Debug, Deserialize, Default)]
pub struct TemplateListScope {
    #[serde(default)]
    pub active_only: bool,
}

/// Standardized API response envelope.
#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T = ()> {
    /// Indicates if the operation was successful
    pub success: bool,
    /// Optional data payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Optional message, typically used for error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse<()> {
    /// Creates an error response with the specified message.
    pub fn error(message: String) -> Self {
        Self { success: false, data: None, message: Some(message) }
    }

    /// Creates a successful response with no data payload.
    pub fn success(message: Option<String>) -> Self {
        Self { success: true, data: None, message }
    }
}

impl<T> ApiResponse<T> {
    /// Creates a successful response with data and an optional message.
    pub fn success_with_data(data: T, message: Option<String>) -> Self {
        Self { success: true, data: Some(data), message }
    }
}

pub type ExecutionRouteResult = Result<Response<axum::body::Body>, ExecutionRouteError>;
pub type TemplateRouteResult = Result<Response<axum::body::Body>, TemplateRouteError>;

/// Wire representation of an execution record.
///
/// Kept separate from the persisted struct so the BSON-oriented serde helpers
/// never leak into the JSON surface.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExecutionResponse {
    pub id: Uuid,
    pub template_id: Uuid,
    pub evidence_id: String,
    pub status: ExecutionStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<ScanOutput>,
    pub error_message: Option<String>,
    pub retry_count: u32,
    pub executor_id: Option<String>,
    pub execution_config: ScanParameters,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ScanExecution> for ExecutionResponse {
    fn from(execution: ScanExecution) -> Self {
        Self {
            id: execution.id,
            template_id: execution.template_id,
            evidence_id: execution.evidence_id,
            status: execution.status,
            started_at: execution.started_at,
            completed_at: execution.completed_at,
            result: execution.result,
            error_message: execution.error_message,
            retry_count: execution.retry_count,
            executor_id: execution.executor_id,
            execution_config: execution.execution_config,
            created_at: execution.created_at,
            updated_at: execution.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExecutionListResponse {
    pub executions: Vec<ExecutionResponse>,
}

/// Wire representation of a scan template.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TemplateResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub scan_kind: ScanKind,
    pub parameters: ScanParameters,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ScanTemplate> for TemplateResponse {
    fn from(template: ScanTemplate) -> Self {
        Self {
            id: template.id,
            name: template.name.clone(),
            description: template.description.clone(),
            scan_kind: template.scan_kind(),
            parameters: template.parameters,
            active: template.active,
            created_at: template.created_at,
            updated_at: template.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateResponse>,
}

/// Request body for creating a template. `parameters` stays opaque here and is
/// decoded against the scan kind's schema during validation.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateTemplateRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub scan_kind: String,
    pub parameters: serde_json::Value,
}

/// Request body for updating a template's mutable fields.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct UpdateTemplateRequest {
    pub description: Option<String>,
    pub parameters: Option<serde_json::Value>,
}
