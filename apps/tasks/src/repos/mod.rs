//! Repository layer: domain-shaped access to persisted records.

pub mod tasks;
