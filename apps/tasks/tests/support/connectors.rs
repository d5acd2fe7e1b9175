//! Test connectors wrapping the real SQLite connector.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use db_infra::DbInfraError;
use sea_orm::DatabaseConnection;
use tasks::{Connector, DbProfile, SqliteConnector, StoreSettings};

/// Holds every open for `delay` so concurrent callers pile up behind it.
pub struct SlowConnector {
    inner: SqliteConnector,
    delay: Duration,
    opens: AtomicUsize,
}

impl SlowConnector {
    pub fn new(profile: DbProfile, delay: Duration) -> Self {
        Self {
            inner: SqliteConnector::new(profile, StoreSettings::default()),
            delay,
            opens: AtomicUsize::new(0),
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for SlowConnector {
    async fn open(&self) -> Result<DatabaseConnection, DbInfraError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.inner.open().await
    }
}

/// Fails the first `failures` opens, then behaves like the real connector.
pub struct FlakyConnector {
    inner: SqliteConnector,
    failures: usize,
    opens: AtomicUsize,
}

impl FlakyConnector {
    pub fn new(profile: DbProfile, failures: usize) -> Self {
        Self {
            inner: SqliteConnector::new(profile, StoreSettings::default()),
            failures,
            opens: AtomicUsize::new(0),
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for FlakyConnector {
    async fn open(&self) -> Result<DatabaseConnection, DbInfraError> {
        let attempt = self.opens.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        if attempt < self.failures {
            return Err(DbInfraError::connect(format!(
                "unable to open database file (attempt {})",
                attempt + 1
            )));
        }
        self.inner.open().await
    }
}
