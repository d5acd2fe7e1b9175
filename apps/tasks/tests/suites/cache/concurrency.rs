use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tasks::{NewTask, TaskCache, TaskStore};
use tasks_test_support::TempDbFile;
use tokio::time::timeout;

use crate::support::{file_provider, memory_cache, Recorder};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_broadcast_strictly_growing_snapshots() {
    let cache = memory_cache();
    let recorder = Recorder::new();
    let _sub = cache.subscribe(recorder.listener());

    let handles = (0..10).map(|i| {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.create(NewTask::new(format!("job {i}"))).await })
    });
    let results = timeout(Duration::from_secs(10), join_all(handles))
        .await
        .expect("creates should finish");

    let mut ids: Vec<i64> = results
        .into_iter()
        .map(|r| r.expect("task should not panic").expect("create should succeed"))
        .collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 10);

    let lengths = recorder.lengths();
    assert_eq!(lengths, (0..=10).collect::<Vec<usize>>());
    assert_eq!(cache.snapshot().len(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn mixed_mutations_on_a_file_store_end_consistent() {
    let file = TempDbFile::new();
    let cache = Arc::new(TaskCache::new(TaskStore::new(file_provider(&file))));
    let recorder = Recorder::new();
    let _sub = cache.subscribe(recorder.listener());

    let seed = cache.create(NewTask::new("seed")).await.unwrap();

    let creates: Vec<_> = (0..5)
        .map(|i| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.create(NewTask::new(format!("n{i}"))).await.map(|_| ()) })
        })
        .collect();
    let cache_for_update = Arc::clone(&cache);
    let update = tokio::spawn(async move {
        cache_for_update
            .update_by_id(seed, NewTask::new("seed").with_done(true))
            .await
            .map(|_| ())
    });

    for handle in creates.into_iter().chain(std::iter::once(update)) {
        handle.await.unwrap().unwrap();
    }

    // initial + seed + 5 creates + 1 update
    assert_eq!(recorder.count(), 8);
    let last = recorder.last().unwrap();
    assert_eq!(last.len(), 6);
    assert!(last.iter().any(|t| t.id == seed && t.is_done));

    let fresh = cache.store().list_all().await.unwrap();
    assert_eq!(*last, fresh);
}
