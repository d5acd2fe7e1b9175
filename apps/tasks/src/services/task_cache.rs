//! In-memory mirror of the task store with change fan-out.
//!
//! `TaskCache` owns the authoritative snapshot. Every mutation runs
//! mutate -> full reload -> broadcast while holding a single async mutex, so
//! two concurrent mutations never interleave their reload/broadcast steps
//! and subscribers only ever see snapshots in storage order.
//!
//! The snapshot is replaced wholesale, never patched, and only after a
//! successful reload. A failed reload leaves the last good snapshot in place
//! and notifies nobody.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex, RwLock};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::repos::tasks::{NewTask, Task, TaskStore};

/// Immutable, shareable view of every task after a reload.
pub type TaskSnapshot = Arc<Vec<Task>>;

type Listener = Arc<dyn Fn(&TaskSnapshot) + Send + Sync>;

/// Listeners keyed by a monotonically increasing token, so iteration order
/// is subscription order.
#[derive(Default)]
struct ListenerRegistry {
    next_token: AtomicU64,
    listeners: Mutex<BTreeMap<u64, Listener>>,
}

impl ListenerRegistry {
    fn register(&self, listener: Listener) -> u64 {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().insert(token, listener);
        token
    }

    fn unregister(&self, token: u64) -> bool {
        self.listeners.lock().remove(&token).is_some()
    }

    /// Copy of the current listeners. Callbacks run against this copy so
    /// they may subscribe or unsubscribe without touching the live map.
    fn listeners(&self) -> Vec<Listener> {
        self.listeners.lock().values().cloned().collect()
    }

    fn len(&self) -> usize {
        self.listeners.lock().len()
    }
}

/// Handle returned by [`TaskCache::subscribe`].
///
/// Dropping it does not unsubscribe; call [`Subscription::unsubscribe`].
/// Unsubscribing twice, or after the cache is gone, does nothing.
#[derive(Clone)]
pub struct Subscription {
    token: u64,
    registry: Weak<ListenerRegistry>,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            if registry.unregister(self.token) {
                debug!("cache=unsubscribe token={}", self.token);
            }
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("token", &self.token)
            .finish()
    }
}

pub struct TaskCache {
    store: TaskStore,
    snapshot: RwLock<TaskSnapshot>,
    registry: Arc<ListenerRegistry>,
    // Orders snapshot replacement against initial delivery to new
    // subscribers. Reentrant so listeners may subscribe from a callback.
    delivery: ReentrantMutex<()>,
    // One mutation (or reload) at a time, including its broadcast.
    mutations: tokio::sync::Mutex<()>,
}

impl TaskCache {
    /// Empty cache over `store`; call [`TaskCache::reload`] to populate it.
    pub fn new(store: TaskStore) -> Self {
        Self {
            store,
            snapshot: RwLock::new(Arc::new(Vec::new())),
            registry: Arc::new(ListenerRegistry::default()),
            delivery: ReentrantMutex::new(()),
            mutations: tokio::sync::Mutex::new(()),
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Current snapshot without waiting on storage.
    pub fn snapshot(&self) -> TaskSnapshot {
        Arc::clone(&self.snapshot.read())
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    /// Register `listener`. It is called right away with the current
    /// snapshot and then after every successful reload.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&TaskSnapshot) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        let _delivery = self.delivery.lock();
        let token = self.registry.register(Arc::clone(&listener));
        let current = self.snapshot();
        debug!("cache=subscribe token={} tasks={}", token, current.len());
        listener(&current);

        Subscription {
            token,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Re-read every task from storage, replace the snapshot and notify
    /// subscribers. On failure the previous snapshot stays and nobody is notified.
    pub async fn reload(&self) -> Result<(), StoreError> {
        let _turn = self.mutations.lock().await;
        self.reload_locked().await
    }

    /// Insert `task`, then reload. Returns the new id.
    pub async fn create(&self, task: NewTask) -> Result<i64, StoreError> {
        let _turn = self.mutations.lock().await;
        let id = self.store.insert(task).await?;
        self.reload_locked().await?;
        Ok(id)
    }

    /// Overwrite task `id`, then reload. Returns the affected row count.
    pub async fn update_by_id(&self, id: i64, task: NewTask) -> Result<u64, StoreError> {
        let _turn = self.mutations.lock().await;
        let affected = self.store.update(id, task).await?;
        self.reload_locked().await?;
        Ok(affected)
    }

    /// Delete task `id`, then reload. Returns the affected row count.
    pub async fn delete_by_id(&self, id: i64) -> Result<u64, StoreError> {
        let _turn = self.mutations.lock().await;
        let affected = self.store.delete(id).await?;
        self.reload_locked().await?;
        Ok(affected)
    }

    /// Delete every task, then reload.
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        let _turn = self.mutations.lock().await;
        self.store.clear_all().await?;
        self.reload_locked().await
    }

    async fn reload_locked(&self) -> Result<(), StoreError> {
        let tasks = self.store.list_all().await?;
        self.publish(Arc::new(tasks));
        Ok(())
    }

    fn publish(&self, snapshot: TaskSnapshot) {
        let _delivery = self.delivery.lock();
        *self.snapshot.write() = Arc::clone(&snapshot);

        let listeners = self.registry.listeners();
        info!(
            "cache=broadcast tasks={} listeners={}",
            snapshot.len(),
            listeners.len()
        );
        for listener in listeners {
            listener(&snapshot);
        }
    }
}
