use std::time::Duration;
use validation_gateway::*;

use test_utils::*;

fn manager() -> BatchSessionManager {
    BatchSessionManager::with_config(&GatewayConfig::testing())
}

fn session_with(manager: &BatchSessionManager, threshold: Option<f64>, valid: u64, invalid: u64) -> String {
    let mut options = SessionOptions::new();
    if let Some(threshold) = threshold {
        options = options.with_threshold(threshold);
    }
    let session = manager.start_session(options).unwrap();
    if valid + invalid > 0 {
        manager.accumulate(&session.batch_id, valid, invalid, 0).unwrap();
    }
    session.batch_id
}

#[test]
fn test_threshold_75_passes_at_80_percent() {
    init_logging();
    let manager = manager();
    let batch_id = session_with(&manager, Some(75.0), 80, 20);

    let verdict = manager.complete(&batch_id).unwrap();
    assert_eq!(verdict.total_records, 100);
    assert_eq!(verdict.success_rate, 80.0);
    assert!(verdict.passed);
    assert_eq!(verdict.status, BatchStatus::Completed);
}

#[test]
fn test_threshold_85_fails_at_80_percent() {
    let manager = manager();
    let batch_id = session_with(&manager, Some(85.0), 80, 20);

    let verdict = manager.complete(&batch_id).unwrap();
    assert!(!verdict.passed);
    assert_eq!(verdict.status, BatchStatus::Failed);
    assert_eq!(manager.get_session(&batch_id).unwrap().status, BatchStatus::Failed);
}

#[test]
fn test_empty_batch_with_threshold_fails() {
    let manager = manager();
    let batch_id = session_with(&manager, Some(10.0), 0, 0);

    let verdict = manager.complete(&batch_id).unwrap();
    assert_eq!(verdict.success_rate, 0.0);
    assert_eq!(verdict.status, BatchStatus::Failed);
}

#[test]
fn test_no_threshold_always_completes() {
    let manager = manager();
    let batch_id = session_with(&manager, None, 1, 99);

    assert_eq!(manager.complete(&batch_id).unwrap().status, BatchStatus::Completed);
}

#[test]
fn test_second_complete_conflicts() {
    let manager = manager();
    let batch_id = session_with(&manager, Some(50.0), 5, 5);
    manager.complete(&batch_id).unwrap();

    let err = manager.complete(&batch_id).unwrap_err();
    assert!(matches!(err, BatchError::AlreadyCompleted { .. }));
    assert_eq!(GatewayError::from(err).code(), GatewayErrorCode::Conflict);
}

#[test]
fn test_accumulate_updates_timestamps() {
    let manager = manager();
    let session = manager.start_session(SessionOptions::new()).unwrap();
    std::thread::sleep(Duration::from_millis(5));

    let updated = manager.accumulate(&session.batch_id, 1, 0, 2).unwrap();
    assert!(updated.last_updated_at > session.created_at);
    assert_eq!(updated.created_at, session.created_at);
    assert_eq!(updated.warning_count, 2);
    assert!(updated.completed_at.is_none());
}

#[tokio::test]
async fn test_cleanup_matches_never_existed() {
    init_logging();
    let manager = manager();
    let batch_id = session_with(&manager, None, 3, 0);
    manager.complete(&batch_id).unwrap();

    // Still queryable during the grace period
    assert!(manager.get_session(&batch_id).is_ok());

    tokio::time::sleep(manager.grace_period() + Duration::from_millis(100)).await;

    let after_cleanup = manager.get_session(&batch_id).unwrap_err();
    let never_existed = manager.get_session("never-existed").unwrap_err();
    assert_eq!(after_cleanup, BatchError::NotFound(batch_id.clone()));
    assert_eq!(
        std::mem::discriminant(&after_cleanup),
        std::mem::discriminant(&never_existed)
    );
    assert!(matches!(manager.accumulate(&batch_id, 1, 0, 0), Err(BatchError::NotFound(_))));
    assert!(matches!(manager.complete(&batch_id), Err(BatchError::NotFound(_))));
    assert!(manager.is_empty());
}

#[test]
fn test_abandoned_sessions_block_capacity_until_idle_timeout() {
    let config = GatewayConfig::testing().with_max_active_sessions(2);
    let manager = BatchSessionManager::with_config(&config);
    manager.start_session(SessionOptions::new()).unwrap();
    manager.start_session(SessionOptions::new()).unwrap();
    assert_eq!(
        manager.start_session(SessionOptions::new()).unwrap_err(),
        BatchError::CapacityExceeded { max: 2 }
    );

    let config = config.with_idle_timeout(Duration::from_millis(30));
    let manager = BatchSessionManager::with_config(&config);
    manager.start_session(SessionOptions::new()).unwrap();
    manager.start_session(SessionOptions::new()).unwrap();

    std::thread::sleep(Duration::from_millis(60));

    let third = manager.start_session(SessionOptions::new()).unwrap();
    assert_eq!(manager.len(), 1);
    assert_eq!(manager.get_session(&third.batch_id).unwrap().status, BatchStatus::Active);
}

#[test]
fn test_session_snapshot_serializes() {
    let manager = manager();
    let session = manager
        .start_session(
            SessionOptions::new()
                .with_batch_id("nightly-import")
                .with_model_type("ticket")
                .with_threshold(90.0),
        )
        .unwrap();

    let value = serde_json::to_value(&session).unwrap();
    assert_eq!(value["batch_id"], "nightly-import");
    assert_eq!(value["status"], "active");
    assert_eq!(value["threshold"], 90.0);
    assert!(value.get("completed_at").is_none());
}
