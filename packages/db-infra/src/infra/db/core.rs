use std::str::FromStr;
use std::time::{Duration, Instant};

use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, SqlxSqliteConnector, Statement};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{info, trace};

use crate::config::db::{make_conn_spec, DbProfile, StoreSettings};
use crate::error::DbInfraError;
use crate::infra::db::diagnostics::sqlite_diagnostics;

/// Get database path description for logging
fn get_db_path(profile: &DbProfile) -> String {
    match profile {
        DbProfile::InMemory => "sqlite::memory:".to_string(),
        DbProfile::SqliteFile { file: Some(file) } => file.clone(),
        DbProfile::SqliteFile { file: None } => "sqlite file (env)".to_string(),
    }
}

/// Ordered per-connection statements. File-level PRAGMAs (journal_mode,
/// synchronous) are handled once in `setup_sqlite_file_prerequisites`.
fn build_session_statements(settings: &StoreSettings) -> Vec<String> {
    vec![
        "PRAGMA foreign_keys = ON;".to_string(),
        format!("PRAGMA busy_timeout = {};", settings.busy_timeout_ms),
    ]
}

async fn apply_sqlite_config(
    conn: &mut sqlx::SqliteConnection,
    statements: &[String],
) -> Result<(), sqlx::Error> {
    for stmt in statements {
        sqlx::query(stmt).execute(&mut *conn).await?;
    }
    Ok(())
}

/// Open a SQLite pool for `profile` and hand it back as a SeaORM connection.
///
/// In-memory pools hold exactly one connection that never idles out, since
/// each SQLite connection to `:memory:` is its own database.
pub async fn build_sqlite_pool(
    profile: &DbProfile,
    settings: &StoreSettings,
) -> Result<DatabaseConnection, DbInfraError> {
    let url = make_conn_spec(profile)?;
    let pool_size = settings.pool_size(profile);
    let start = Instant::now();

    let connect_opts = SqliteConnectOptions::from_str(&url)
        .map_err(|e| DbInfraError::config(format!("invalid SQLite connection options: {e}")))?
        .create_if_missing(true);

    let statements = build_session_statements(settings);
    let mut pool_opts = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(pool_size)
        .acquire_timeout(Duration::from_millis(settings.acquire_timeout_ms))
        .after_connect(move |conn, _meta| {
            let statements = statements.clone();
            Box::pin(async move {
                apply_sqlite_config(conn, &statements).await?;
                trace!("db=sqlite hook=after_connect ok");
                Ok::<_, sqlx::Error>(())
            })
        });
    if profile.is_memory() {
        pool_opts = pool_opts.idle_timeout(None).max_lifetime(None);
    }

    let pool: SqlitePool = pool_opts
        .connect_with(connect_opts)
        .await
        .map_err(|e| DbInfraError::connect(format!("failed to open SQLite pool: {e}")))?;

    // warm-up so a broken file fails here rather than on the first query
    let mut conn = pool
        .acquire()
        .await
        .map_err(|e| DbInfraError::connect(format!("connection acquisition failed: {e}")))?;
    sqlx::query("SELECT 1;")
        .execute(&mut *conn)
        .await
        .map_err(|e| DbInfraError::connect(format!("warmup query failed: {e}")))?;
    drop(conn);

    let db = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);

    if !profile.is_memory() {
        setup_sqlite_file_prerequisites(&db).await?;
    }

    let pool_id = sqlite_diagnostics::connection_id(&db);
    sqlite_diagnostics::log_pragma_snapshot(&db, "shared").await;

    info!(
        "pool=create engine=sqlite path={} pool_id={} max={} acquire_timeout_ms={} elapsed_ms={}",
        get_db_path(profile),
        pool_id,
        pool_size,
        settings.acquire_timeout_ms,
        start.elapsed().as_millis()
    );
    Ok(db)
}

async fn setup_sqlite_file_prerequisites(db: &DatabaseConnection) -> Result<(), DbInfraError> {
    for pragma in ["PRAGMA journal_mode = WAL;", "PRAGMA synchronous = NORMAL;"] {
        db.execute(Statement::from_string(DatabaseBackend::Sqlite, pragma))
            .await
            .map_err(|e| DbInfraError::config(format!("failed to apply '{pragma}': {e}")))?;
    }
    Ok(())
}

/// Create the schema on an open handle. Idempotent: re-running on a
/// migrated database applies nothing.
pub async fn run_schema_setup(db: &DatabaseConnection) -> Result<(), DbInfraError> {
    let start = Instant::now();

    migrate(db, MigrationCommand::Up)
        .await
        .map_err(|e| DbInfraError::migration(format!("schema setup failed: {e}")))?;

    info!(
        "schema=ready elapsed_ms={}",
        start.elapsed().as_millis()
    );
    Ok(())
}

/// Open the store for `profile` and run `command` against it.
pub async fn orchestrate_migration(
    profile: &DbProfile,
    settings: &StoreSettings,
    command: MigrationCommand,
) -> Result<(), DbInfraError> {
    if profile.is_memory() && command != MigrationCommand::Status {
        return Err(DbInfraError::config(
            "migrations against an in-memory database are discarded on exit; use a SQLite file",
        ));
    }

    info!("migrate=start path={} cmd={command:?}", get_db_path(profile));

    let db = build_sqlite_pool(profile, settings).await?;
    migrate(&db, command)
        .await
        .map_err(|e| DbInfraError::migration(format!("migration execution failed: {e}")))?;

    info!("migrate=done");
    Ok(())
}
