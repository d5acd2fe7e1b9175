use std::sync::{Arc, Mutex};

use tasks::{NewTask, TaskCache};

use crate::support::{memory_cache, memory_store, Recorder};

#[tokio::test]
async fn late_subscriber_gets_current_snapshot_immediately() {
    let store = memory_store();
    store.insert(NewTask::new("already here")).await.unwrap();
    let cache = TaskCache::new(store);
    cache.reload().await.unwrap();

    let recorder = Recorder::new();
    let _sub = cache.subscribe(recorder.listener());

    assert_eq!(recorder.count(), 1);
    assert_eq!(recorder.titles(0), vec!["already here".to_string()]);
}

#[tokio::test]
async fn subscribe_before_reload_sees_empty_then_loaded() {
    let store = memory_store();
    store.insert(NewTask::new("on disk")).await.unwrap();
    let cache = TaskCache::new(store);

    let recorder = Recorder::new();
    let _sub = cache.subscribe(recorder.listener());
    cache.reload().await.unwrap();

    assert_eq!(recorder.lengths(), vec![0, 1]);
}

#[tokio::test]
async fn unsubscribed_listener_hears_nothing_more() {
    let cache = memory_cache();
    let gone = Recorder::new();
    let stays = Recorder::new();

    let sub = cache.subscribe(gone.listener());
    let _keep = cache.subscribe(stays.listener());
    sub.unsubscribe();
    sub.unsubscribe();

    cache.create(NewTask::new("one")).await.unwrap();
    cache.create(NewTask::new("two")).await.unwrap();

    assert_eq!(gone.count(), 1, "initial delivery only");
    assert_eq!(stays.count(), 3);
    assert_eq!(cache.subscriber_count(), 1);
}

#[tokio::test]
async fn listeners_run_in_subscription_order() {
    let cache = memory_cache();
    let order = Arc::new(Mutex::new(Vec::new()));

    let subs: Vec<_> = (0..4)
        .map(|i| {
            let order = Arc::clone(&order);
            cache.subscribe(move |_| order.lock().unwrap().push(i))
        })
        .collect();
    order.lock().unwrap().clear();

    cache.create(NewTask::new("ping")).await.unwrap();
    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);

    subs[1].unsubscribe();
    order.lock().unwrap().clear();
    cache.create(NewTask::new("pong")).await.unwrap();
    assert_eq!(*order.lock().unwrap(), vec![0, 2, 3]);
}

#[tokio::test]
async fn listener_may_subscribe_from_inside_a_callback() {
    let cache = memory_cache();
    let nested = Recorder::new();
    let armed = Arc::new(Mutex::new(true));

    let inner_cache = Arc::clone(&cache);
    let inner_recorder = nested.clone();
    let _outer = cache.subscribe(move |snapshot| {
        if !snapshot.is_empty() && std::mem::take(&mut *armed.lock().unwrap()) {
            inner_cache.subscribe(inner_recorder.listener());
        }
    });

    cache.create(NewTask::new("trigger")).await.unwrap();
    assert_eq!(nested.lengths(), vec![1]);

    cache.create(NewTask::new("again")).await.unwrap();
    assert_eq!(nested.lengths(), vec![1, 2]);
}
