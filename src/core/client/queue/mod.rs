pub mod error;
pub mod sqs;

use crate::types::queue::QueueType;
use async_trait::async_trait;
pub use error::QueueError;
use omniqueue::Delivery;
use std::time::Duration;

/// Trait defining queue operations
///
/// Delivery semantics are at-least-once: a message may be delivered more than
/// once (worker crash before acknowledgement, visibility timeout) and no
/// ordering is guaranteed, not even for messages about the same evidence id.
/// Consumers are written to tolerate both.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueueClient: Send + Sync {
    async fn send_message(&self, queue: QueueType, payload: String, delay: Option<Duration>) -> Result<(), QueueError>;
    async fn consume_message_from_queue(&self, queue: QueueType) -> Result<Delivery, QueueError>;
}
