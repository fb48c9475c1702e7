use crate::core::config::Config;
use crate::types::queue::QueueType;
use crate::worker::parser::ScanRequest;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Fire-and-forget producer invoked by the evidence-management collaborator
/// whenever automated evidence is created or its template changes.
pub struct ScanRequestProducer;

impl ScanRequestProducer {
    /// Enqueues a scan request, returning whether the message was queued.
    ///
    /// Enqueue failure is deliberately non-fatal: automated collection is a
    /// best-effort enhancement and must never block the evidence record from
    /// existing. The caller surfaces `false` as a warning; the evidence simply
    /// has no execution history until a later request succeeds.
    pub async fn enqueue(control_id: &str, evidence_id: &str, config: Arc<Config>) -> bool {
        let message = ScanRequest { control_id: control_id.to_string(), evidence_id: evidence_id.to_string() };
        let payload = match serde_json::to_string(&message) {
            Ok(payload) => payload,
            Err(e) => {
                error!(evidence_id = %evidence_id, error = %e, "Failed to serialize scan request");
                return false;
            }
        };

        match config.queue().send_message(QueueType::ScanRequest, payload, None).await {
            Ok(()) => {
                debug!(control_id = %control_id, evidence_id = %evidence_id, "Queued scan request");
                true
            }
            Err(e) => {
                warn!(
                    control_id = %control_id,
                    evidence_id = %evidence_id,
                    error = %e,
                    "Failed to queue scan request; evidence will have no execution until re-requested"
                );
                false
            }
        }
    }
}
