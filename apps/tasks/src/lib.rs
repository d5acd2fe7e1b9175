#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod bin_support;
pub mod db;
pub mod entities;
pub mod error;
pub mod repos;
pub mod services;
pub mod telemetry;

// Re-exports for public API
pub use db::{ConnectionProvider, Connector, SqliteConnector};
pub use db_infra::{DbProfile, StoreSettings};
pub use error::{StoreError, StoreOp};
pub use repos::tasks::{NewTask, Task, TaskStore};
pub use services::task_cache::{Subscription, TaskCache, TaskSnapshot};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    tasks_test_support::logging::init();
}
