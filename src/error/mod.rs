pub mod event;
pub mod execution;
pub mod other;

use crate::core::client::database::DatabaseError;
use crate::core::client::queue::QueueError;
use crate::core::client::scanner::ScannerError;
use crate::error::event::EventSystemError;
use crate::error::execution::ExecutionError;
use thiserror::Error;

pub use event::ConsumptionError;

/// Result type for orchestrator operations
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Error types for the orchestrator
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Queue error: {0}")]
    QueueError(#[from] QueueError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Scanner error: {0}")]
    ScannerError(#[from] ScannerError),

    #[error("Execution error: {0}")]
    ExecutionError(#[from] ExecutionError),

    #[error("Event System Error: {0}")]
    EventSystemError(#[from] EventSystemError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Run Command error
    #[error("Run Command Error: {0}")]
    RunCommandError(String),

    #[error("Orchestrator Error: {0}")]
    OrchestratorAnyHowError(#[from] anyhow::Error),

    /// Mongo error
    #[error("Mongo error: {0}")]
    MongoError(#[from] mongodb::error::Error),

    /// Error while building the metrics exporter
    #[error("OTL Metrics Error: {0}")]
    OTLMetricsError(#[from] opentelemetry::metrics::MetricsError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
