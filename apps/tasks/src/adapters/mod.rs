//! Adapters for external dependencies.

pub mod tasks_sea;
