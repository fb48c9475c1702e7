use crate::core::config::Config;
use crate::error::event::{EventSystemError, EventSystemResult};
use crate::types::queue::QueueType;
use crate::worker::controller::event_worker::EventWorker;

use std::sync::{Arc, Mutex};
use strum::IntoEnumIterator;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, Instrument};

/// Spawns and supervises one [`EventWorker`] per queue type.
#[derive(Clone)]
pub struct WorkerController {
    config: Arc<Config>,
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
    cancellation_token: CancellationToken,
}

impl WorkerController {
    pub fn new(config: Arc<Config>, cancellation_token: CancellationToken) -> Self {
        Self { config, handles: Arc::new(Mutex::new(Vec::new())), cancellation_token }
    }

    /// start - Spawn all event workers in the background
    pub fn start(&self) -> EventSystemResult<()> {
        let mut handles = self.handles.lock().map_err(|e| EventSystemError::MutexPoisonError(e.to_string()))?;
        for queue_type in QueueType::iter() {
            let worker_token = self.cancellation_token.child_token();
            let worker = Arc::new(EventWorker::new(queue_type.clone(), self.config.clone(), worker_token));
            let span = info_span!("event_worker", queue = %queue_type);
            let handle = tokio::spawn(
                async move {
                    if let Err(e) = worker.run().await {
                        error!(error = ?e, "Event worker exited with error");
                    }
                }
                .instrument(span),
            );
            handles.push(handle);
        }
        info!("Started {} event worker(s)", handles.len());
        Ok(())
    }

    /// shutdown - Signal all workers to stop and wait for them to drain
    pub async fn shutdown(&self) -> EventSystemResult<()> {
        info!("Shutting down worker controller");
        self.cancellation_token.cancel();

        let handles = {
            let mut guard = self.handles.lock().map_err(|e| EventSystemError::MutexPoisonError(e.to_string()))?;
            std::mem::take(&mut *guard)
        };
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Worker task failed during shutdown");
            }
        }
        info!("Worker controller shutdown complete");
        Ok(())
    }
}
