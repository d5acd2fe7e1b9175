pub mod core;
pub mod diagnostics;

pub use self::core::{build_sqlite_pool, orchestrate_migration, run_schema_setup};
pub use diagnostics::sqlite_diagnostics;
