//! Acquisition pipeline integration tests
//!
//! Runs the production resolver (reqwest transport) against an in-process
//! mock of the repository contents API.

mod helpers;

use attendance_client::services::StorageId;
use attendance_client::{AttendanceError, DatasetKey, StatusKind};
use helpers::{
    sample_dataset, MockRepositoryServer, MockResponse, BACKUP_REPO, OWNER, PRIMARY_REPO,
    TOKEN_PREFIX, TOKEN_SUFFIX,
};
use std::time::Duration;

fn key() -> DatasetKey {
    DatasetKey::new("1", "Introduction_to_Anatomy").unwrap()
}

const FILE_NAME: &str = "Y1_Introduction_to_Anatomy_attendance.json";

#[tokio::test]
async fn primary_success_is_cached_and_backup_untouched() {
    let server = MockRepositoryServer::start().await;
    server.respond(PRIMARY_REPO, MockResponse::Raw(sample_dataset()));
    server.respond(BACKUP_REPO, MockResponse::Status(500));
    let dir = tempfile::tempdir().unwrap();
    let pipeline = server.pipeline(dir.path());

    let records = pipeline.get_dataset(&key(), false, None).await.unwrap();

    assert_eq!(records.len(), 2);
    assert!(dir.path().join(FILE_NAME).exists());
    assert_eq!(server.requests_to(BACKUP_REPO), 0);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].owner, OWNER);
    assert_eq!(requests[0].path, FILE_NAME);
    assert_eq!(requests[0].git_ref.as_deref(), Some("main"));
    assert_eq!(
        requests[0].accept.as_deref(),
        Some("application/vnd.github.v3.raw")
    );
    assert_eq!(
        requests[0].authorization,
        Some(format!("token {}{}", TOKEN_PREFIX, TOKEN_SUFFIX))
    );
}

#[tokio::test]
async fn fresh_cache_means_no_network_on_second_call() {
    let server = MockRepositoryServer::start().await;
    server.respond(PRIMARY_REPO, MockResponse::Raw(sample_dataset()));
    let dir = tempfile::tempdir().unwrap();
    let pipeline = server.pipeline(dir.path());

    let first = pipeline.get_dataset(&key(), false, None).await.unwrap();
    let hits_after_first = server.requests().len();
    let second = pipeline.get_dataset(&key(), false, None).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(hits_after_first, 1);
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn cache_hit_leaves_entry_untouched() {
    let server = MockRepositoryServer::start().await;
    server.respond(PRIMARY_REPO, MockResponse::Raw(sample_dataset()));
    let dir = tempfile::tempdir().unwrap();
    let pipeline = server.pipeline(dir.path());
    let id = pipeline.store().path_for(&key());

    pipeline.get_dataset(&key(), false, None).await.unwrap();
    let stored_at = pipeline.store().stored_at(&id).await.unwrap();
    let contents = std::fs::read(dir.path().join(FILE_NAME)).unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    pipeline.get_dataset(&key(), false, None).await.unwrap();

    assert_eq!(pipeline.store().stored_at(&id).await.unwrap(), stored_at);
    assert_eq!(std::fs::read(dir.path().join(FILE_NAME)).unwrap(), contents);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn successful_fetch_rewrites_entry_once() {
    let server = MockRepositoryServer::start().await;
    server.respond(PRIMARY_REPO, MockResponse::Raw(sample_dataset()));
    let dir = tempfile::tempdir().unwrap();
    let pipeline = server.pipeline(dir.path());
    let id = pipeline.store().path_for(&key());

    pipeline.get_dataset(&key(), false, None).await.unwrap();
    let first_write = pipeline.store().stored_at(&id).await.unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    pipeline.get_dataset(&key(), true, None).await.unwrap();

    assert!(pipeline.store().stored_at(&id).await.unwrap() > first_write);
    assert_eq!(pipeline.store().list().await.unwrap().len(), 1);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn force_refresh_bypasses_fresh_cache() {
    let server = MockRepositoryServer::start().await;
    server.respond(PRIMARY_REPO, MockResponse::Raw(sample_dataset()));
    let dir = tempfile::tempdir().unwrap();
    let pipeline = server.pipeline(dir.path());

    pipeline.get_dataset(&key(), false, None).await.unwrap();
    pipeline.get_dataset(&key(), true, None).await.unwrap();

    assert_eq!(server.requests_to(PRIMARY_REPO), 2);
}

#[tokio::test]
async fn primary_not_found_falls_back_to_wrapped_backup() {
    let server = MockRepositoryServer::start().await;
    server.respond(PRIMARY_REPO, MockResponse::Status(404));
    server.respond(BACKUP_REPO, MockResponse::Wrapped(sample_dataset()));
    let dir = tempfile::tempdir().unwrap();
    let pipeline = server.pipeline(dir.path());

    let records = pipeline.get_dataset(&key(), false, None).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].student_id().as_deref(), Some("2023002"));
    assert_eq!(server.requests_to(PRIMARY_REPO), 1);
    assert_eq!(server.requests_to(BACKUP_REPO), 1);

    let backup = &server.requests()[1];
    assert_eq!(
        backup.accept.as_deref(),
        Some("application/vnd.github.v3+json")
    );
    assert_eq!(
        backup.authorization,
        Some(format!("token {}{}", TOKEN_PREFIX, TOKEN_SUFFIX))
    );
}

#[tokio::test]
async fn both_providers_failing_names_both_paths_and_writes_nothing() {
    let server = MockRepositoryServer::start().await;
    server.respond(PRIMARY_REPO, MockResponse::Status(404));
    server.respond(BACKUP_REPO, MockResponse::Status(403));
    let dir = tempfile::tempdir().unwrap();
    let pipeline = server.pipeline(dir.path());

    let err = pipeline.get_dataset(&key(), false, None).await.unwrap_err();

    assert!(matches!(err, AttendanceError::SourceExhausted { .. }));
    assert_eq!(
        err.attempted_paths(),
        vec![
            format!("{}/{}", PRIMARY_REPO, FILE_NAME),
            format!("{}/{}", BACKUP_REPO, FILE_NAME)
        ]
    );
    let message = err.to_string();
    assert!(message.contains(&format!("{}/{}", PRIMARY_REPO, FILE_NAME)));
    assert!(message.contains(&format!("{}/{}", BACKUP_REPO, FILE_NAME)));
    assert!(!dir.path().join(FILE_NAME).exists());
}

#[tokio::test]
async fn remote_failure_is_not_masked_by_stale_cache() {
    let server = MockRepositoryServer::start().await;
    server.respond(PRIMARY_REPO, MockResponse::Raw(sample_dataset()));
    let dir = tempfile::tempdir().unwrap();
    let pipeline = server
        .pipeline(dir.path())
        .with_max_age(Duration::from_millis(1));

    pipeline.get_dataset(&key(), false, None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    server.respond(PRIMARY_REPO, MockResponse::Status(502));
    server.respond(BACKUP_REPO, MockResponse::Status(502));

    let err = pipeline.get_dataset(&key(), false, None).await.unwrap_err();
    assert!(matches!(err, AttendanceError::SourceExhausted { .. }));
}

#[tokio::test]
async fn malformed_primary_payload_does_not_try_backup() {
    let server = MockRepositoryServer::start().await;
    server.respond(PRIMARY_REPO, MockResponse::Raw("this is not json".to_string()));
    server.respond(BACKUP_REPO, MockResponse::Wrapped(sample_dataset()));
    let dir = tempfile::tempdir().unwrap();
    let pipeline = server.pipeline(dir.path());

    let err = pipeline.get_dataset(&key(), false, None).await.unwrap_err();

    assert!(matches!(err, AttendanceError::MalformedPayload { .. }));
    assert_eq!(server.requests_to(BACKUP_REPO), 0);
}

#[tokio::test]
async fn cache_write_failure_still_returns_data() {
    let server = MockRepositoryServer::start().await;
    server.respond(PRIMARY_REPO, MockResponse::Raw(sample_dataset()));
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the cache folder should be
    let blocked = dir.path().join("not-a-folder");
    std::fs::write(&blocked, "occupied").unwrap();
    let pipeline = server.pipeline(&blocked);

    let records = pipeline.get_dataset(&key(), false, None).await.unwrap();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn corrupt_fresh_cache_surfaces_corrupt_data() {
    let server = MockRepositoryServer::start().await;
    server.respond(PRIMARY_REPO, MockResponse::Raw(sample_dataset()));
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(FILE_NAME), "{{{").unwrap();
    let pipeline = server.pipeline(dir.path());

    let err = pipeline.get_dataset(&key(), false, None).await.unwrap_err();

    assert!(matches!(err, AttendanceError::CorruptData { .. }));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn lookup_student_builds_report() {
    let server = MockRepositoryServer::start().await;
    server.respond(PRIMARY_REPO, MockResponse::Raw(sample_dataset()));
    let dir = tempfile::tempdir().unwrap();
    let pipeline = server.pipeline(dir.path());

    let report = pipeline
        .lookup_student(&key(), " 2023001 ", false, None)
        .await
        .unwrap();

    assert_eq!(report.name.as_deref(), Some("Mariam Hassan"));
    assert_eq!(report.stats.status, StatusKind::Pass);
    assert_eq!(report.stats.percentage, "90");
    let names: Vec<&str> = report.subjects.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Anatomy", "Histology"]);
    assert_eq!(report.subjects[0].percentage, 91.7);
    assert_eq!(report.subjects[0].sessions.len(), 2);
}

#[tokio::test]
async fn lookup_distinguishes_missing_student_from_network_failure() {
    let server = MockRepositoryServer::start().await;
    server.respond(PRIMARY_REPO, MockResponse::Raw(sample_dataset()));
    let dir = tempfile::tempdir().unwrap();
    let pipeline = server.pipeline(dir.path());

    let missing = pipeline
        .lookup_student(&key(), "999", false, None)
        .await
        .unwrap_err();
    assert!(matches!(missing, AttendanceError::StudentNotFound { .. }));
    assert!(missing.is_not_found());

    let blank = pipeline.lookup_student(&key(), "  ", false, None).await.unwrap_err();
    assert!(matches!(blank, AttendanceError::Validation(_)));

    let other_key = DatasetKey::new("2", "CNS").unwrap();
    server.respond(PRIMARY_REPO, MockResponse::Status(500));
    let network = pipeline
        .lookup_student(&other_key, "2023001", false, None)
        .await
        .unwrap_err();
    assert!(!network.is_not_found());
}

#[tokio::test]
async fn clear_cache_removes_every_dataset() {
    let server = MockRepositoryServer::start().await;
    server.respond(PRIMARY_REPO, MockResponse::Raw(sample_dataset()));
    let dir = tempfile::tempdir().unwrap();
    let pipeline = server.pipeline(dir.path());

    pipeline.get_dataset(&key(), false, None).await.unwrap();
    pipeline
        .get_dataset(&DatasetKey::new("2", "CNS").unwrap(), false, None)
        .await
        .unwrap();

    assert_eq!(pipeline.store().list().await.unwrap().len(), 2);
    assert_eq!(pipeline.clear_cache().await.unwrap(), 2);
    assert!(pipeline
        .store()
        .list()
        .await
        .unwrap()
        .iter()
        .all(|id: &StorageId| !id.is_attendance_file()));
    assert_eq!(pipeline.available_modules("1").len(), 10);
}
