/// SQLite diagnostics and connection tracking
pub mod sqlite_diagnostics {
    use std::process;

    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
    use tracing::debug;

    /// Consistent connection-based identifier for logging correlation:
    /// PID + backend + connection pointer.
    pub fn connection_id<C: ConnectionTrait>(conn: &C) -> String {
        let pid = process::id();
        let backend = match conn.get_database_backend() {
            DatabaseBackend::Sqlite => "sq",
            DatabaseBackend::Postgres => "pg",
            DatabaseBackend::MySql => "my",
        };
        let conn_ptr = conn as *const _ as usize;
        format!("{}-{}-{:x}", pid, backend, conn_ptr % 0xFFFF)
    }

    /// Log PRAGMA values at debug level. Best effort: unreadable pragmas are skipped.
    pub async fn log_pragma_snapshot<C: ConnectionTrait>(conn: &C, pool_type: &str) {
        let pragmas = ["journal_mode", "synchronous", "busy_timeout", "foreign_keys"];

        for pragma in pragmas {
            let query = format!("PRAGMA {pragma};");
            if let Ok(Some(row)) = conn
                .query_one(Statement::from_string(DatabaseBackend::Sqlite, query))
                .await
            {
                // busy_timeout reports its value under the column "timeout"
                let column = if pragma == "busy_timeout" { "timeout" } else { pragma };
                let value = row
                    .try_get::<String>("", column)
                    .ok()
                    .or_else(|| row.try_get::<i64>("", column).ok().map(|v| v.to_string()));

                if let Some(value) = value {
                    debug!(
                        pool_type = pool_type,
                        pragma = pragma,
                        value = value,
                        "PRAGMA snapshot"
                    );
                }
            }
        }
    }
}
