use crate::error::other::OtherError;
use thiserror::Error;

pub type EventSystemResult<T> = Result<T, EventSystemError>;

/// ConsumptionError - Errors raised while pulling and dispatching queue messages
#[derive(Error, Debug)]
pub enum ConsumptionError {
    #[error("Failed to consume message from queue, error {error_msg:?}")]
    FailedToConsumeFromQueue { error_msg: String },

    #[error("Failed to handle scan request for evidence {evidence_id:?}. Error: {error_msg:?}")]
    FailedToHandleScanRequest { evidence_id: String, error_msg: String },

    #[error("Failed to acknowledge message: {0}")]
    FailedToAcknowledgeMessage(String),

    #[error("Other error: {0}")]
    Other(#[from] OtherError),
}

/// EventSystemError - Error type for the worker event system
#[derive(Error, Debug)]
pub enum EventSystemError {
    #[error("Message Parsing Serde Error: {0}")]
    PayloadSerdeError(String),

    #[error("Mutex poison error: {0}")]
    MutexPoisonError(String),

    #[error("ConsumptionError: {0}")]
    FromConsumptionError(#[from] ConsumptionError),

    #[error("Other error: {0}")]
    Other(#[from] OtherError),
}
