use crate::core::client::database::DatabaseError;
use crate::core::client::scanner::ScannerError;
use crate::error::other::OtherError;
use thiserror::Error;
use uuid::Uuid;

pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Error types for scan-execution operations
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Scanner error: {0}")]
    ScannerError(#[from] ScannerError),

    /// Indicates the requested execution could not be found
    #[error("Failed to find execution with id {id:?}")]
    ExecutionNotFound { id: Uuid },

    #[error("Other error: {0}")]
    Other(#[from] OtherError),
}
