use tasks::NewTask;

use crate::support::{memory_cache, Recorder};

#[tokio::test]
async fn every_mutation_broadcasts_once_to_every_subscriber() {
    let cache = memory_cache();
    let a = Recorder::new();
    let b = Recorder::new();
    let _sa = cache.subscribe(a.listener());
    let _sb = cache.subscribe(b.listener());

    let id = cache.create(NewTask::new("draft")).await.unwrap();
    cache
        .update_by_id(id, NewTask::new("final").with_done(true))
        .await
        .unwrap();
    cache.delete_by_id(id).await.unwrap();

    for recorder in [&a, &b] {
        assert_eq!(recorder.lengths(), vec![0, 1, 1, 0]);
        assert_eq!(recorder.titles(1), vec!["draft".to_string()]);
        assert_eq!(recorder.titles(2), vec!["final".to_string()]);
    }
}

#[tokio::test]
async fn broadcast_snapshot_matches_cache_snapshot() {
    let cache = memory_cache();
    let recorder = Recorder::new();
    let _sub = cache.subscribe(recorder.listener());

    cache.create(NewTask::new("x").with_due_at(10)).await.unwrap();
    cache.create(NewTask::new("y").with_due_at(5)).await.unwrap();

    let last = recorder.last().unwrap();
    assert_eq!(last, cache.snapshot());
    assert_eq!(recorder.titles(2), vec!["y".to_string(), "x".to_string()]);
}

#[tokio::test]
async fn missing_id_mutations_still_reload_and_broadcast() {
    let cache = memory_cache();
    let recorder = Recorder::new();
    let _sub = cache.subscribe(recorder.listener());

    assert_eq!(cache.update_by_id(999, NewTask::new("ghost")).await.unwrap(), 0);
    assert_eq!(cache.delete_by_id(999).await.unwrap(), 0);

    assert_eq!(recorder.count(), 3);
}

#[tokio::test]
async fn clear_all_broadcasts_an_empty_snapshot() {
    let cache = memory_cache();
    cache.create(NewTask::new("a")).await.unwrap();
    cache.create(NewTask::new("b")).await.unwrap();

    let recorder = Recorder::new();
    let _sub = cache.subscribe(recorder.listener());
    cache.clear_all().await.unwrap();

    assert_eq!(recorder.lengths(), vec![2, 0]);
    assert!(cache.snapshot().is_empty());
}
