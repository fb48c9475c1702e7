use crate::core::client::database::{DatabaseError, MockDatabaseClient};
use crate::core::client::scanner::{MockComplianceScanClient, ScannerError};
use crate::tests::common::{
    apply_updates, build_evidence, build_execution, build_summary, build_template, TestConfigBuilder,
};
use crate::types::execution::ExecutionStatus;
use crate::types::scan::ComplianceOutcome;
use crate::worker::event_handler::service::ExecutionHandlerService;
use crate::worker::parser::ScanRequest;
use mockall::Sequence;
use rstest::*;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

fn scan_request(evidence_id: &str) -> ScanRequest {
    ScanRequest { control_id: "ctl-1".to_string(), evidence_id: evidence_id.to_string() }
}

#[rstest]
#[tokio::test]
async fn missing_evidence_drops_request_without_creating_execution() {
    let mut db = MockDatabaseClient::new();
    db.expect_get_evidence_by_id().withf(|id| id == "ev-gone").times(1).returning(|_| Ok(None));
    // No create_execution expectation: any attempt to create one panics.
    let config = TestConfigBuilder::new().with_database(db).build();

    let result = ExecutionHandlerService::handle_scan_request(&scan_request("ev-gone"), config).await;
    assert!(result.is_ok());
}

#[rstest]
#[case::no_template(build_evidence("ev-1", None, Some("111122223333")))]
#[case::no_target_account(build_evidence("ev-1", Some(Uuid::new_v4()), None))]
#[case::empty_target_account(build_evidence("ev-1", Some(Uuid::new_v4()), Some("")))]
#[tokio::test]
async fn unscannable_evidence_is_skipped_permanently(#[case] evidence: crate::types::evidence::EvidenceItem) {
    let mut db = MockDatabaseClient::new();
    let returned = evidence.clone();
    db.expect_get_evidence_by_id().times(1).returning(move |_| Ok(Some(returned.clone())));
    let config = TestConfigBuilder::new().with_database(db).build();

    let result = ExecutionHandlerService::handle_scan_request(&scan_request("ev-1"), config).await;
    assert!(result.is_ok());
}

#[rstest]
#[tokio::test]
async fn missing_or_retired_template_is_skipped_permanently() {
    for template in [None, Some(build_template(false))] {
        let template_id = template.as_ref().map(|t| t.id).unwrap_or_else(Uuid::new_v4);
        let evidence = build_evidence("ev-1", Some(template_id), Some("111122223333"));

        let mut db = MockDatabaseClient::new();
        let returned_evidence = evidence.clone();
        db.expect_get_evidence_by_id().times(1).returning(move |_| Ok(Some(returned_evidence.clone())));
        db.expect_get_template_by_id().times(1).returning(move |_| Ok(template.clone()));
        let config = TestConfigBuilder::new().with_database(db).build();

        let result = ExecutionHandlerService::handle_scan_request(&scan_request("ev-1"), config).await;
        assert!(result.is_ok());
    }
}

#[rstest]
#[tokio::test]
async fn successful_scan_walks_pending_running_completed() {
    let template = build_template(true);
    let evidence = build_evidence("ev-1", Some(template.id), Some("111122223333"));

    let mut db = MockDatabaseClient::new();
    let mut seq = Sequence::new();

    let returned_evidence = evidence.clone();
    db.expect_get_evidence_by_id()
        .times(1)
        .in_sequence(&mut seq)
        .returning(move |_| Ok(Some(returned_evidence.clone())));
    let returned_template = template.clone();
    db.expect_get_template_by_id()
        .withf(move |id| *id == template.id)
        .times(1)
        .in_sequence(&mut seq)
        .returning(move |_| Ok(Some(returned_template.clone())));
    db.expect_get_latest_pending_execution().times(1).in_sequence(&mut seq).returning(|_| Ok(None));
    db.expect_create_execution()
        .withf(|execution| execution.status == ExecutionStatus::Pending && execution.retry_count == 0)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|execution| Ok(execution));
    db.expect_update_execution()
        .withf(|current, update| {
            current.status == ExecutionStatus::Pending
                && update.status == Some(ExecutionStatus::Running)
                && update.started_at.is_some()
                && matches!(update.executor_id, Some(Some(_)))
                && matches!(update.error_message, Some(None))
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|current, update| Ok(apply_updates(current, &update)));
    db.expect_set_latest_execution().withf(|id, _| id == "ev-1").times(1).in_sequence(&mut seq).returning(|_, _| Ok(()));
    db.expect_update_execution()
        .withf(|current, update| {
            current.status == ExecutionStatus::Running
                && update.status == Some(ExecutionStatus::Completed)
                && update.completed_at.is_some()
                && update.result.is_some()
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|current, update| Ok(apply_updates(current, &update)));

    let mut scanner = MockComplianceScanClient::new();
    scanner
        .expect_scan()
        .withf(|account, region, prefixes| {
            account == "111122223333" && region == "us-east-1" && prefixes == ["s3-bucket-".to_string()]
        })
        .times(1)
        .returning(|_, _, _| Ok(build_summary(&[("s3-bucket-public-read", ComplianceOutcome::Compliant)])));

    let config = TestConfigBuilder::new().with_database(db).with_scanner(scanner).build();
    let result = ExecutionHandlerService::handle_scan_request(&scan_request("ev-1"), config).await;
    assert!(result.is_ok());
}

#[rstest]
#[tokio::test]
async fn scan_failure_is_captured_on_the_execution_and_acked() {
    let template = build_template(true);
    let evidence = build_evidence("ev-1", Some(template.id), Some("111122223333"));

    let mut db = MockDatabaseClient::new();
    let returned_evidence = evidence.clone();
    db.expect_get_evidence_by_id().returning(move |_| Ok(Some(returned_evidence.clone())));
    let returned_template = template.clone();
    db.expect_get_template_by_id().returning(move |_| Ok(Some(returned_template.clone())));
    db.expect_get_latest_pending_execution().returning(|_| Ok(None));
    db.expect_create_execution().returning(|execution| Ok(execution));
    db.expect_set_latest_execution().returning(|_, _| Ok(()));

    let mut seq = Sequence::new();
    db.expect_update_execution()
        .withf(|_, update| update.status == Some(ExecutionStatus::Running))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|current, update| Ok(apply_updates(current, &update)));
    db.expect_update_execution()
        .withf(|current, update| {
            current.status == ExecutionStatus::Running
                && update.status == Some(ExecutionStatus::Failed)
                && update.completed_at.is_some()
                && matches!(update.error_message, Some(Some(ref message)) if message.contains("assume scan role"))
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|current, update| Ok(apply_updates(current, &update)));

    let mut scanner = MockComplianceScanClient::new();
    scanner.expect_scan().returning(|account, _, _| {
        Err(ScannerError::AssumeRoleFailure { account_id: account.to_string(), message: "AccessDenied".to_string() })
    });

    let config = TestConfigBuilder::new().with_database(db).with_scanner(scanner).build();
    // Failure is terminal until a human retries: the handler reports success
    // so the message is acknowledged, not redelivered forever.
    let result = ExecutionHandlerService::handle_scan_request(&scan_request("ev-1"), config).await;
    assert!(result.is_ok());
}

#[rstest]
#[tokio::test]
async fn redelivered_message_creates_a_second_execution_row() {
    let template = build_template(true);
    let evidence = build_evidence("ev-1", Some(template.id), Some("111122223333"));
    let latest_pointer_writes: Arc<Mutex<Vec<Uuid>>> = Arc::new(Mutex::new(Vec::new()));

    let mut db = MockDatabaseClient::new();
    let returned_evidence = evidence.clone();
    db.expect_get_evidence_by_id().times(2).returning(move |_| Ok(Some(returned_evidence.clone())));
    let returned_template = template.clone();
    db.expect_get_template_by_id().times(2).returning(move |_| Ok(Some(returned_template.clone())));
    db.expect_get_latest_pending_execution().times(2).returning(|_| Ok(None));
    db.expect_create_execution().times(2).returning(|execution| Ok(execution));
    db.expect_update_execution().times(4).returning(|current, update| Ok(apply_updates(current, &update)));
    let writes = latest_pointer_writes.clone();
    db.expect_set_latest_execution().times(2).returning(move |_, execution_id| {
        writes.lock().unwrap().push(execution_id);
        Ok(())
    });

    let mut scanner = MockComplianceScanClient::new();
    scanner.expect_scan().times(2).returning(|_, _, _| Ok(build_summary(&[])));

    let config = TestConfigBuilder::new().with_database(db).with_scanner(scanner).build();
    let request = scan_request("ev-1");
    ExecutionHandlerService::handle_scan_request(&request, config.clone()).await.unwrap();
    ExecutionHandlerService::handle_scan_request(&request, config).await.unwrap();

    // Two rows exist and the pointer holds whichever write landed last. With
    // concurrent workers either order is possible; the race is accepted and
    // last write wins.
    let writes = latest_pointer_writes.lock().unwrap();
    assert_eq!(writes.len(), 2);
    assert_ne!(writes[0], writes[1]);
}

#[rstest]
#[tokio::test]
async fn pending_execution_from_user_retry_is_adopted_not_duplicated() {
    let template = build_template(true);
    let evidence = build_evidence("ev-1", Some(template.id), Some("111122223333"));
    let mut pending = build_execution("ev-1", ExecutionStatus::Pending);
    pending.retry_count = 2;
    let pending_id = pending.id;

    let mut db = MockDatabaseClient::new();
    let returned_evidence = evidence.clone();
    db.expect_get_evidence_by_id().returning(move |_| Ok(Some(returned_evidence.clone())));
    let returned_template = template.clone();
    db.expect_get_template_by_id().returning(move |_| Ok(Some(returned_template.clone())));
    let returned_pending = pending.clone();
    db.expect_get_latest_pending_execution().times(1).returning(move |_| Ok(Some(returned_pending.clone())));
    // No create_execution expectation: adoption must not mint a second row.
    db.expect_update_execution()
        .withf(move |current, _| current.id == pending_id)
        .times(2)
        .returning(|current, update| Ok(apply_updates(current, &update)));
    db.expect_set_latest_execution()
        .withf(move |_, execution_id| *execution_id == pending_id)
        .times(1)
        .returning(|_, _| Ok(()));

    let mut scanner = MockComplianceScanClient::new();
    scanner.expect_scan().returning(|_, _, _| Ok(build_summary(&[])));

    let config = TestConfigBuilder::new().with_database(db).with_scanner(scanner).build();
    ExecutionHandlerService::handle_scan_request(&scan_request("ev-1"), config).await.unwrap();
}

#[rstest]
#[tokio::test]
async fn concurrent_cancel_wins_over_inflight_scan_result() {
    let template = build_template(true);
    let evidence = build_evidence("ev-1", Some(template.id), Some("111122223333"));

    let mut db = MockDatabaseClient::new();
    let returned_evidence = evidence.clone();
    db.expect_get_evidence_by_id().returning(move |_| Ok(Some(returned_evidence.clone())));
    let returned_template = template.clone();
    db.expect_get_template_by_id().returning(move |_| Ok(Some(returned_template.clone())));
    db.expect_get_latest_pending_execution().returning(|_| Ok(None));
    db.expect_create_execution().returning(|execution| Ok(execution));
    db.expect_set_latest_execution().returning(|_, _| Ok(()));

    let mut seq = Sequence::new();
    db.expect_update_execution()
        .withf(|_, update| update.status == Some(ExecutionStatus::Running))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|current, update| Ok(apply_updates(current, &update)));
    // A user cancelled while the scan ran: the guarded completion update
    // matches nothing. The worker must treat that as settled, not an error.
    db.expect_update_execution()
        .withf(|_, update| update.status == Some(ExecutionStatus::Completed))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|current, _| {
            Err(DatabaseError::UpdateFailed(format!("execution {} is no longer in status running", current.id)))
        });

    let mut scanner = MockComplianceScanClient::new();
    scanner.expect_scan().returning(|_, _, _| Ok(build_summary(&[])));

    let config = TestConfigBuilder::new().with_database(db).with_scanner(scanner).build();
    let result = ExecutionHandlerService::handle_scan_request(&scan_request("ev-1"), config).await;
    assert!(result.is_ok());
}

// A worker that dies mid-scan past the hosting timeout leaves its execution
// in `running` with no watchdog to reclaim it; redelivery then records a
// fresh attempt alongside the stuck row. That gap is deliberate and this test
// documents it rather than "fixing" it.
#[rstest]
#[tokio::test]
async fn crashed_worker_leaves_running_row_and_redelivery_starts_fresh() {
    let template = build_template(true);
    let evidence = build_evidence("ev-1", Some(template.id), Some("111122223333"));

    let mut db = MockDatabaseClient::new();
    let returned_evidence = evidence.clone();
    db.expect_get_evidence_by_id().returning(move |_| Ok(Some(returned_evidence.clone())));
    let returned_template = template.clone();
    db.expect_get_template_by_id().returning(move |_| Ok(Some(returned_template.clone())));
    // The stuck row is `running`, not `pending`, so redelivery does not adopt
    // it and a new row is created.
    db.expect_get_latest_pending_execution().times(1).returning(|_| Ok(None));
    db.expect_create_execution().times(1).returning(|execution| Ok(execution));
    db.expect_update_execution().times(2).returning(|current, update| Ok(apply_updates(current, &update)));
    db.expect_set_latest_execution().times(1).returning(|_, _| Ok(()));

    let mut scanner = MockComplianceScanClient::new();
    scanner.expect_scan().returning(|_, _, _| Ok(build_summary(&[])));

    let config = TestConfigBuilder::new().with_database(db).with_scanner(scanner).build();
    ExecutionHandlerService::handle_scan_request(&scan_request("ev-1"), config).await.unwrap();
}
