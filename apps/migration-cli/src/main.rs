use clap::Parser;
use db_infra::config::db::{DbProfile, StoreSettings};
use db_infra::infra::db::orchestrate_migration;
use migration::MigrationCommand;

#[derive(Parser)]
#[command(name = "migration-cli")]
#[command(about = "Task store schema migration tool")]
struct Args {
    /// Migration command to run: up | down | fresh | reset | refresh | status
    command: MigrationCommand,

    /// SQLite file to migrate
    #[arg(long, env = "TASKS_DB_FILE")]
    db_file: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .without_time()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_env_filter("migration=info,db_infra=info,sqlx=warn")
        .init();

    let args = Args::parse();

    let settings = match StoreSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(2);
        }
    };
    let profile = DbProfile::SqliteFile {
        file: Some(args.db_file),
    };

    if let Err(e) = orchestrate_migration(&profile, &settings, args.command).await {
        eprintln!("Migration failed: {e}");
        std::process::exit(1);
    }
}
