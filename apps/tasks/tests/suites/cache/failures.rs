use std::sync::Arc;

use tasks::{ConnectionProvider, DbProfile, NewTask, StoreOp, TaskCache, TaskStore};

use crate::support::connectors::FlakyConnector;
use crate::support::{exec_raw, memory_cache, Recorder};

#[tokio::test]
async fn failed_reload_keeps_last_snapshot_and_stays_silent() {
    let cache = memory_cache();
    cache.create(NewTask::new("survivor")).await.unwrap();
    let before = cache.snapshot();

    let recorder = Recorder::new();
    let _sub = cache.subscribe(recorder.listener());

    exec_raw(cache.store().provider(), "DROP TABLE tasks").await;
    let err = cache.reload().await.unwrap_err();
    assert_eq!(err.op(), Some(StoreOp::ListAll));

    assert!(Arc::ptr_eq(&before, &cache.snapshot()));
    assert_eq!(recorder.count(), 1, "initial delivery only");
}

#[tokio::test]
async fn failed_mutation_does_not_reload_or_broadcast() {
    let cache = memory_cache();
    let recorder = Recorder::new();
    let _sub = cache.subscribe(recorder.listener());

    exec_raw(cache.store().provider(), "DROP TABLE tasks").await;

    let err = cache.create(NewTask::new("lost")).await.unwrap_err();
    assert_eq!(err.op(), Some(StoreOp::Insert));
    let err = cache.clear_all().await.unwrap_err();
    assert_eq!(err.op(), Some(StoreOp::ClearAll));

    assert_eq!(recorder.count(), 1);
    assert!(cache.snapshot().is_empty());
}

#[tokio::test]
async fn initialization_failure_reaches_the_caller_then_recovers() {
    let connector = Arc::new(FlakyConnector::new(DbProfile::InMemory, 1));
    let cache = TaskCache::new(TaskStore::new(Arc::new(ConnectionProvider::new(connector))));
    let recorder = Recorder::new();
    let _sub = cache.subscribe(recorder.listener());

    let err = cache.create(NewTask::new("first try")).await.unwrap_err();
    assert!(err.is_initialization());
    assert_eq!(recorder.count(), 1);

    cache.create(NewTask::new("second try")).await.unwrap();
    assert_eq!(recorder.lengths(), vec![0, 1]);
}

#[tokio::test]
async fn reload_failure_after_a_committed_write_keeps_old_snapshot() {
    let cache = memory_cache();
    let first = cache.create(NewTask::new("good row")).await.unwrap();
    let before = cache.snapshot();

    let recorder = Recorder::new();
    let _sub = cache.subscribe(recorder.listener());

    // A text due date cannot be decoded, so every full listing fails.
    exec_raw(
        cache.store().provider(),
        "INSERT INTO tasks (title, updated_at, datetime_at) VALUES ('undecodable', 0, 'notanint')",
    )
    .await;

    let err = cache.create(NewTask::new("written anyway")).await.unwrap_err();
    assert_eq!(err.op(), Some(StoreOp::ListAll));
    assert!(Arc::ptr_eq(&before, &cache.snapshot()));
    assert_eq!(recorder.count(), 1, "initial delivery only");

    // ids: first, then the undecodable row, then the committed write
    let written = cache
        .store()
        .get_by_id(first + 2)
        .await
        .unwrap()
        .expect("write was committed");
    assert_eq!(written.title, "written anyway");

    exec_raw(cache.store().provider(), "DELETE FROM tasks WHERE title = 'undecodable'").await;
    cache.reload().await.unwrap();
    let titles: Vec<String> = cache.snapshot().iter().map(|t| t.title.clone()).collect();
    assert_eq!(titles, vec!["good row".to_string(), "written anyway".to_string()]);
    assert_eq!(recorder.count(), 2);
}
