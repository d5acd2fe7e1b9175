use std::env;

use crate::error::DbInfraError;

pub const DB_FILE_VAR: &str = "TASKS_DB_FILE";
pub const BUSY_TIMEOUT_VAR: &str = "TASKS_DB_BUSY_TIMEOUT_MS";
pub const ACQUIRE_TIMEOUT_VAR: &str = "TASKS_DB_ACQUIRE_TIMEOUT_MS";
pub const POOL_MAX_VAR: &str = "TASKS_DB_POOL_MAX";

/// Where the task store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbProfile {
    /// Private in-memory database, gone when the pool closes
    InMemory,
    /// SQLite file; `None` resolves the path from `TASKS_DB_FILE`
    SqliteFile { file: Option<String> },
}

impl DbProfile {
    /// `SqliteFile` when `TASKS_DB_FILE` is set, otherwise `InMemory`.
    pub fn from_env() -> Self {
        match env::var(DB_FILE_VAR) {
            Ok(file) if !file.trim().is_empty() => DbProfile::SqliteFile { file: Some(file) },
            _ => DbProfile::InMemory,
        }
    }

    pub fn is_memory(&self) -> bool {
        matches!(self, DbProfile::InMemory)
    }
}

/// Per-pool knobs. Every connection gets `busy_timeout_ms` so a locked
/// store fails with SQLITE_BUSY instead of hanging the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub busy_timeout_ms: u64,
    pub acquire_timeout_ms: u64,
    pub pool_max: u32,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5000,
            acquire_timeout_ms: 5000,
            pool_max: 4,
        }
    }
}

impl StoreSettings {
    /// Defaults overridden by `TASKS_DB_*` env vars when present.
    pub fn from_env() -> Result<Self, DbInfraError> {
        let defaults = Self::default();
        Ok(Self {
            busy_timeout_ms: parse_var(BUSY_TIMEOUT_VAR)?.unwrap_or(defaults.busy_timeout_ms),
            acquire_timeout_ms: parse_var(ACQUIRE_TIMEOUT_VAR)?
                .unwrap_or(defaults.acquire_timeout_ms),
            pool_max: parse_var(POOL_MAX_VAR)?.unwrap_or(defaults.pool_max),
        })
    }

    /// Effective pool size; in-memory databases are per-connection so they get exactly one.
    pub fn pool_size(&self, profile: &DbProfile) -> u32 {
        if profile.is_memory() {
            1
        } else {
            self.pool_max.max(1)
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>, DbInfraError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            DbInfraError::config(format!(
                "Environment variable '{name}' has an invalid value: '{raw}'"
            ))
        }),
        Err(_) => Ok(None),
    }
}

/// Resolve the database file path for a file profile.
pub fn sqlite_file_spec(profile: &DbProfile) -> Result<String, DbInfraError> {
    match profile {
        DbProfile::SqliteFile { file: Some(file) } => Ok(file.clone()),
        DbProfile::SqliteFile { file: None } => must_var(DB_FILE_VAR),
        DbProfile::InMemory => Err(DbInfraError::config(
            "sqlite_file_spec called for an in-memory profile",
        )),
    }
}

/// Build the SQLx connection URL for a profile.
pub fn make_conn_spec(profile: &DbProfile) -> Result<String, DbInfraError> {
    match profile {
        DbProfile::InMemory => Ok("sqlite::memory:".to_string()),
        DbProfile::SqliteFile { .. } => {
            let file = sqlite_file_spec(profile)?;
            Ok(format!("sqlite://{file}?mode=rwc"))
        }
    }
}

fn must_var(name: &str) -> Result<String, DbInfraError> {
    env::var(name).map_err(|_| {
        DbInfraError::config(format!("Required environment variable '{name}' is not set"))
    })
}
