use chrono::Utc;
use opentelemetry::KeyValue;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::core::client::database::DatabaseError;
use crate::core::config::Config;
use crate::error::execution::ExecutionError;
use crate::types::evidence::EvidenceItem;
use crate::types::execution::{ExecutionStatus, ExecutionUpdates, ScanExecution};
use crate::types::template::ScanTemplate;
use crate::utils::metrics::ORCHESTRATOR_METRICS;
use crate::worker::event_handler::factory;
use crate::worker::parser::ScanRequest;
use crate::worker::producer::ScanRequestProducer;
use tracing::{error, info, warn};

pub struct ExecutionHandlerService;

impl ExecutionHandlerService {
    /// Processes one scan request end to end.
    ///
    /// Conditions that make the request permanently unprocessable (evidence
    /// gone, no template assigned, no target account, template retired) are
    /// logged and swallowed so the message is acknowledged; redelivering them
    /// could never succeed. Scan failures are captured on the execution record
    /// and also acknowledged; they stay terminal until a user retries.
    /// Only infrastructure errors (database unreachable) propagate, which
    /// nacks the message and lets the queue redeliver it as a fresh attempt.
    pub async fn handle_scan_request(request: &ScanRequest, config: Arc<Config>) -> Result<(), ExecutionError> {
        let start = Instant::now();

        let Some((evidence, template)) = Self::resolve_scan_context(request, config.clone()).await? else {
            return Ok(());
        };

        // Adopt the newest pending execution if a user retry produced one,
        // otherwise record a fresh attempt. Redelivered messages land in the
        // "fresh attempt" arm and create a second row; that is intended.
        let execution = match config.database().get_latest_pending_execution(&request.evidence_id).await? {
            Some(pending) => pending,
            None => {
                config
                    .database()
                    .create_execution(ScanExecution::new_pending(
                        template.id,
                        request.evidence_id.clone(),
                        template.parameters.clone(),
                    ))
                    .await?
            }
        };

        let executor_id = format!("scan-worker-{}", Uuid::new_v4());
        let running = match config
            .database()
            .update_execution(
                &execution,
                ExecutionUpdates::new()
                    .update_status(ExecutionStatus::Running)
                    .update_started_at(Utc::now())
                    .update_executor_id(executor_id)
                    .clear_error_message()
                    .build(),
            )
            .await
        {
            Ok(running) => running,
            Err(DatabaseError::UpdateFailed(reason)) => {
                // Another worker claimed the pending row, or the user
                // cancelled it before we got here.
                info!(
                    execution_id = %execution.id,
                    evidence_id = %request.evidence_id,
                    reason = %reason,
                    "Execution no longer claimable; dropping scan request"
                );
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        config.database().set_latest_execution(&request.evidence_id, running.id).await?;
        info!(
            execution_id = %running.id,
            evidence_id = %request.evidence_id,
            template_id = %template.id,
            "Started scan execution"
        );

        let handler = factory::get_scan_handler(running.execution_config.kind());
        let scan_result = handler.run_scan(&running.execution_config, &evidence, config.clone()).await;

        match scan_result {
            Ok(output) => {
                let completion = config
                    .database()
                    .update_execution(
                        &running,
                        ExecutionUpdates::new()
                            .update_status(ExecutionStatus::Completed)
                            .update_completed_at(Utc::now())
                            .update_result(output)
                            .build(),
                    )
                    .await;
                Self::finish_transition(completion, &running, "completed")?;
                Self::record_operation_metrics(true, "scan", start);
            }
            Err(e) => {
                error!(execution_id = %running.id, evidence_id = %request.evidence_id, error = %e, "Scan failed");
                let failure = config
                    .database()
                    .update_execution(
                        &running,
                        ExecutionUpdates::new()
                            .update_status(ExecutionStatus::Failed)
                            .update_completed_at(Utc::now())
                            .update_error_message(e.to_string())
                            .build(),
                    )
                    .await;
                Self::finish_transition(failure, &running, "failed")?;
                Self::record_operation_metrics(false, "scan", start);
            }
        }

        Ok(())
    }

    /// Cancels an execution; succeeds only from `pending` or `running`.
    ///
    /// Cancellation is a state update only: a scan already in flight runs to
    /// completion, and its final write loses against the absorbed `cancelled`
    /// status instead of resurrecting the record.
    pub async fn cancel_execution(id: Uuid, config: Arc<Config>) -> Result<bool, ExecutionError> {
        let start = Instant::now();
        let execution = Self::get_execution(id, config.clone()).await?;

        if !execution.status.is_cancellable() {
            warn!(execution_id = %id, status = %execution.status, "Cannot cancel execution");
            return Ok(false);
        }

        match config
            .database()
            .update_execution(
                &execution,
                ExecutionUpdates::new()
                    .update_status(ExecutionStatus::Cancelled)
                    .update_completed_at(Utc::now())
                    .build(),
            )
            .await
        {
            Ok(_) => {
                info!(execution_id = %id, "Cancelled execution");
                Self::record_operation_metrics(true, "cancel", start);
                Ok(true)
            }
            // The execution transitioned concurrently (e.g. the worker
            // finished first); report the cancel as not applied.
            Err(DatabaseError::UpdateFailed(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Retries a failed execution: failed -> pending, clearing the error and
    /// executor and incrementing the retry counter, then re-enqueues a scan
    /// request so a worker picks the pending row back up.
    pub async fn retry_execution(id: Uuid, config: Arc<Config>) -> Result<bool, ExecutionError> {
        let start = Instant::now();
        let execution = Self::get_execution(id, config.clone()).await?;

        if execution.status != ExecutionStatus::Failed {
            warn!(execution_id = %id, status = %execution.status, "Cannot retry execution");
            return Ok(false);
        }

        let retried = match config
            .database()
            .update_execution(
                &execution,
                ExecutionUpdates::new()
                    .update_status(ExecutionStatus::Pending)
                    .clear_error_message()
                    .clear_executor_id()
                    .update_retry_count(execution.retry_count + 1)
                    .build(),
            )
            .await
        {
            Ok(retried) => retried,
            Err(DatabaseError::UpdateFailed(_)) => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        info!(execution_id = %id, retry_count = retried.retry_count, "Marked execution for retry");
        Self::record_operation_metrics(true, "retry", start);

        // Best-effort: if the enqueue fails the execution stays pending until
        // a later request for the same evidence adopts it.
        match config.database().get_evidence_by_id(&retried.evidence_id).await? {
            Some(evidence) => {
                ScanRequestProducer::enqueue(&evidence.control_id, &evidence.id, config.clone()).await;
            }
            None => {
                warn!(execution_id = %id, evidence_id = %retried.evidence_id, "Evidence gone; retry not re-enqueued");
            }
        }

        Ok(true)
    }

    pub(crate) async fn get_execution(id: Uuid, config: Arc<Config>) -> Result<ScanExecution, ExecutionError> {
        config.database().get_execution_by_id(id).await?.ok_or(ExecutionError::ExecutionNotFound { id })
    }

    /// Resolves the evidence record and its template, logging and returning
    /// `None` for the permanent, not-retryable conditions under which no
    /// execution must be created.
    async fn resolve_scan_context(
        request: &ScanRequest,
        config: Arc<Config>,
    ) -> Result<Option<(EvidenceItem, ScanTemplate)>, ExecutionError> {
        let Some(evidence) = config.database().get_evidence_by_id(&request.evidence_id).await? else {
            warn!(evidence_id = %request.evidence_id, control_id = %request.control_id, "Evidence no longer exists; dropping scan request");
            return Ok(None);
        };
        let Some(template_id) = evidence.template_id else {
            warn!(evidence_id = %evidence.id, "Evidence has no template assigned; dropping scan request");
            return Ok(None);
        };
        if evidence.target_account_id.as_deref().map_or(true, str::is_empty) {
            warn!(evidence_id = %evidence.id, "Evidence has no target account; dropping scan request");
            return Ok(None);
        }
        let Some(template) = config.database().get_template_by_id(template_id).await? else {
            warn!(evidence_id = %evidence.id, template_id = %template_id, "Template no longer exists; dropping scan request");
            return Ok(None);
        };
        if !template.active {
            warn!(evidence_id = %evidence.id, template_id = %template.id, "Template is deactivated; dropping scan request");
            return Ok(None);
        }
        Ok(Some((evidence, template)))
    }

    /// Tolerates losing a terminal transition to a concurrent cancel: the
    /// scan result (or failure) is discarded and the record stays cancelled.
    fn finish_transition(
        result: Result<ScanExecution, DatabaseError>,
        running: &ScanExecution,
        target: &str,
    ) -> Result<(), ExecutionError> {
        match result {
            Ok(_) => Ok(()),
            Err(DatabaseError::UpdateFailed(_)) => {
                info!(
                    execution_id = %running.id,
                    target_status = target,
                    "Execution was cancelled while the scan was in flight; outcome discarded"
                );
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn record_operation_metrics(success: bool, operation: &str, start: Instant) {
        let attributes = [KeyValue::new("operation_type", operation.to_string())];
        if success {
            ORCHESTRATOR_METRICS.successful_execution_operations.add(1, &attributes);
        } else {
            ORCHESTRATOR_METRICS.failed_execution_operations.add(1, &attributes);
        }
        ORCHESTRATOR_METRICS.executions_response_time.record(start.elapsed().as_secs_f64(), &attributes);
    }
}
