//! Lazily opened, process-wide storage handle.
//!
//! The provider moves through `Uninitialized -> Initializing -> Ready`.
//! The first caller installs a shared pending future; every caller that
//! arrives while it is in flight awaits that same future, so one open and
//! one schema setup run no matter how many tasks ask at once. A failed
//! attempt drops back to `Uninitialized` so the next call starts over.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use db_infra::{build_sqlite_pool, run_schema_setup, DbInfraError, DbProfile, StoreSettings};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use sea_orm::DatabaseConnection;
use tracing::{debug, info, warn};

use crate::error::StoreError;

/// Opens a raw storage handle. Schema setup is the provider's job.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(&self) -> Result<DatabaseConnection, DbInfraError>;

    /// Short description for logs.
    fn describe(&self) -> String {
        "custom".to_string()
    }
}

/// Production connector backed by a SQLx SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    profile: DbProfile,
    settings: StoreSettings,
}

impl SqliteConnector {
    pub fn new(profile: DbProfile, settings: StoreSettings) -> Self {
        Self { profile, settings }
    }
}

#[async_trait]
impl Connector for SqliteConnector {
    async fn open(&self) -> Result<DatabaseConnection, DbInfraError> {
        build_sqlite_pool(&self.profile, &self.settings).await
    }

    fn describe(&self) -> String {
        format!("{:?}", self.profile)
    }
}

type InitFuture = Shared<BoxFuture<'static, Result<Arc<DatabaseConnection>, StoreError>>>;

enum InitState {
    Uninitialized,
    Initializing { attempt: u64, pending: InitFuture },
    Ready(Arc<DatabaseConnection>),
}

pub struct ConnectionProvider {
    connector: Arc<dyn Connector>,
    state: Mutex<InitState>,
    attempts: AtomicU64,
    setup_runs: Arc<AtomicUsize>,
}

impl ConnectionProvider {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            state: Mutex::new(InitState::Uninitialized),
            attempts: AtomicU64::new(0),
            setup_runs: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn from_profile(profile: DbProfile, settings: StoreSettings) -> Self {
        Self::new(Arc::new(SqliteConnector::new(profile, settings)))
    }

    /// Return the ready handle, opening and migrating storage on first use.
    pub async fn get_connection(&self) -> Result<Arc<DatabaseConnection>, StoreError> {
        let (attempt, pending) = {
            let mut state = self.state.lock();
            let in_flight = match &*state {
                InitState::Ready(conn) => return Ok(Arc::clone(conn)),
                InitState::Initializing { attempt, pending } => Some((*attempt, pending.clone())),
                InitState::Uninitialized => None,
            };

            match in_flight {
                Some((attempt, pending)) => {
                    debug!("store=init_join attempt={attempt}");
                    (attempt, pending)
                }
                None => {
                    let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    let pending = initialize(
                        Arc::clone(&self.connector),
                        Arc::clone(&self.setup_runs),
                        attempt,
                    )
                    .boxed()
                    .shared();
                    *state = InitState::Initializing {
                        attempt,
                        pending: pending.clone(),
                    };
                    (attempt, pending)
                }
            }
        };

        let result = pending.await;

        // First waiter back settles the state; later waiters of the same
        // attempt find it already settled and leave it alone.
        let mut state = self.state.lock();
        if let InitState::Initializing { attempt: current, .. } = &*state {
            if *current == attempt {
                *state = match &result {
                    Ok(conn) => InitState::Ready(Arc::clone(conn)),
                    Err(_) => InitState::Uninitialized,
                };
            }
        }

        result
    }

    pub fn is_ready(&self) -> bool {
        matches!(&*self.state.lock(), InitState::Ready(_))
    }

    /// Number of schema setups this provider has started.
    pub fn setup_runs(&self) -> usize {
        self.setup_runs.load(Ordering::SeqCst)
    }

    /// Number of initialization attempts this provider has started.
    pub fn init_attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

async fn initialize(
    connector: Arc<dyn Connector>,
    setup_runs: Arc<AtomicUsize>,
    attempt: u64,
) -> Result<Arc<DatabaseConnection>, StoreError> {
    let start = Instant::now();
    info!(
        "store=init_start attempt={} target={}",
        attempt,
        connector.describe()
    );

    let conn = connector.open().await.map_err(|e| {
        warn!("store=init_failed attempt={attempt} stage=open err={e}");
        StoreError::from(e)
    })?;

    setup_runs.fetch_add(1, Ordering::SeqCst);
    run_schema_setup(&conn).await.map_err(|e| {
        warn!("store=init_failed attempt={attempt} stage=schema err={e}");
        StoreError::from(e)
    })?;

    info!(
        "store=ready attempt={} elapsed_ms={}",
        attempt,
        start.elapsed().as_millis()
    );
    Ok(Arc::new(conn))
}
