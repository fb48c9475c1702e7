use crate::core::config::Config;
use crate::error::event::{ConsumptionError, EventSystemResult};
use crate::types::queue::{QueueControlConfig, QueueType};
use crate::worker::event_handler::service::ExecutionHandlerService;
use crate::worker::parser::ScanRequest;
use crate::worker::traits::message::MessageParser;
use omniqueue::Delivery;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

const QUEUE_NO_MESSAGE_SLEEP_DURATION: Duration = Duration::from_millis(1000);
const QUEUE_ERROR_SLEEP_DURATION: Duration = Duration::from_secs(1);

/// A long-lived consumer of one queue.
///
/// Pulls deliveries, fans them out to at most `max_message_count` concurrent
/// handler tasks and acknowledges each message according to its outcome.
/// Instances are stateless; any number of them can consume the same queue
/// concurrently.
#[derive(Clone)]
pub struct EventWorker {
    config: Arc<Config>,
    queue_type: QueueType,
    queue_control: QueueControlConfig,
    cancellation_token: CancellationToken,
}

impl EventWorker {
    pub fn new(queue_type: QueueType, config: Arc<Config>, cancellation_token: CancellationToken) -> Self {
        let queue_control = config.queue_control().clone();
        Self { config, queue_type, queue_control, cancellation_token }
    }

    /// Triggers a graceful shutdown
    pub fn shutdown(&self) {
        info!("Triggering shutdown for {} worker", self.queue_type);
        self.cancellation_token.cancel();
    }

    /// Check if shutdown has been requested (non-blocking)
    pub fn is_shutdown_requested(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    /// get_message - Get the next message from the queue
    ///
    /// Returns `Ok(None)` when the queue is currently empty.
    async fn get_message(&self) -> EventSystemResult<Option<Delivery>> {
        match self.config.queue().consume_message_from_queue(self.queue_type.clone()).await {
            Ok(delivery) => Ok(Some(delivery)),
            Err(crate::core::client::queue::QueueError::ErrorFromQueueError(omniqueue::QueueError::NoData)) => {
                Ok(None)
            }
            Err(e) => {
                error!(queue = ?self.queue_type, error = %e, "Failed to consume message from queue");
                Err(ConsumptionError::FailedToConsumeFromQueue { error_msg: e.to_string() })?
            }
        }
    }

    /// process_message - Parse, handle and acknowledge one delivery
    ///
    /// A payload that does not parse is acknowledged and dropped: it can never
    /// become processable through redelivery, and leaving it nacked would poison
    /// the queue.
    async fn process_message(&self, message: Delivery) -> EventSystemResult<()> {
        let request = match ScanRequest::parse_message(&message) {
            Ok(request) => request,
            Err(e) => {
                error!(queue = %self.queue_type, error = %e, "Dropping malformed queue message");
                message.ack().await.map_err(|e| ConsumptionError::FailedToAcknowledgeMessage(e.0.to_string()))?;
                return Ok(());
            }
        };

        let correlation_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "scan_request",
            queue = %self.queue_type,
            evidence_id = %request.evidence_id,
            control_id = %request.control_id,
            correlation_id = %correlation_id,
        );
        async move {
            debug!("Received message from queue");
            let result = ExecutionHandlerService::handle_scan_request(&request, self.config.clone())
                .await
                .map_err(|e| ConsumptionError::FailedToHandleScanRequest {
                    evidence_id: request.evidence_id.clone(),
                    error_msg: e.to_string(),
                });
            self.post_processing(result.map_err(Into::into), message).await
        }
        .instrument(span)
        .await
    }

    /// post_processing - Acknowledge or negatively acknowledge the message
    /// based on the result of the handling
    async fn post_processing(&self, result: EventSystemResult<()>, message: Delivery) -> EventSystemResult<()> {
        if let Err(error) = result {
            error!(queue = %self.queue_type, error = %error, "Failed to handle message; requeueing for redelivery");
            // Redelivery reprocesses the message as a brand-new attempt; the
            // failed attempt is never resumed.
            message.nack().await.map_err(|e| ConsumptionError::FailedToAcknowledgeMessage(e.0.to_string()))?;
            return Err(error);
        }

        message.ack().await.map_err(|e| ConsumptionError::FailedToAcknowledgeMessage(e.0.to_string()))?;
        Ok(())
    }

    /// run - Consume the queue until shutdown is requested
    ///
    /// Handler failures are contained per message: one bad message cannot
    /// stall the loop or unrelated messages.
    pub async fn run(&self) -> EventSystemResult<()> {
        let mut tasks: JoinSet<EventSystemResult<()>> = JoinSet::new();
        let max_concurrent_tasks = self.queue_control.max_message_count;
        info!("Starting {} worker (pool_size={})", self.queue_type, max_concurrent_tasks);

        loop {
            if self.is_shutdown_requested() {
                info!("Shutdown requested, stopping message processing");
                break;
            }

            tokio::select! {
                biased;

                // 1. Reap completed handler tasks first to free pool slots
                Some(result) = tasks.join_next(), if !tasks.is_empty() => {
                    Self::handle_task_result(result);
                }

                // 2. Handle shutdown signal
                _ = self.cancellation_token.cancelled() => {
                    info!("Shutdown signal received, breaking from main loop");
                    break;
                }

                // 3. Pull the next message while below the concurrency cap
                message_result = self.get_message(), if tasks.len() < max_concurrent_tasks => {
                    match message_result {
                        Ok(Some(message)) => {
                            let worker = self.clone();
                            tasks.spawn(async move { worker.process_message(message).await });
                            debug!(active = tasks.len(), "Spawned message handler task");
                        }
                        Ok(None) => sleep(QUEUE_NO_MESSAGE_SLEEP_DURATION).await,
                        Err(e) => {
                            error!("Error receiving message: {:?}", e);
                            sleep(QUEUE_ERROR_SLEEP_DURATION).await;
                        }
                    }
                }
            }
        }

        // Drain in-flight handlers before reporting shutdown complete
        info!("Waiting for {} remaining tasks to complete", tasks.len());
        while let Some(result) = tasks.join_next().await {
            Self::handle_task_result(result);
        }
        info!("All tasks completed, worker shutdown complete");

        Ok(())
    }

    fn handle_task_result(result: Result<EventSystemResult<()>, tokio::task::JoinError>) {
        match result {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                warn!("Message handling failed: {:?}", e);
            }
            Err(e) => {
                error!("Task panicked or was cancelled: {:?}", e);
            }
        }
    }
}
