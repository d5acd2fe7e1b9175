//! Shared storage configuration and schema bootstrap infrastructure.
//! Used by the tasks app and the migration CLI.

pub mod config;
pub mod error;
pub mod infra;

pub use config::db;
pub use config::db::{make_conn_spec, sqlite_file_spec, DbProfile, StoreSettings};
pub use error::DbInfraError;
pub use infra::db::core::{build_sqlite_pool, orchestrate_migration, run_schema_setup};
