use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tasks::bin_support::commands::{render_json, render_text, run, Command};
use tasks::{ConnectionProvider, DbProfile, StoreSettings, TaskCache, TaskStore};
use tracing::debug;

#[derive(Parser)]
#[command(name = "tasks")]
#[command(about = "Local task list backed by SQLite")]
struct Args {
    /// SQLite file to use; falls back to TASKS_DB_FILE, then an in-memory store
    #[arg(long, global = true)]
    db_file: Option<String>,

    /// Print the resulting task list as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    tasks::telemetry::init_tracing();

    let args = Args::parse();

    let profile = match args.db_file {
        Some(file) => DbProfile::SqliteFile { file: Some(file) },
        None => DbProfile::from_env(),
    };
    let settings = match StoreSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ {e}");
            return ExitCode::from(1);
        }
    };

    let provider = Arc::new(ConnectionProvider::from_profile(profile, settings));
    let cache = TaskCache::new(TaskStore::new(provider));

    let view = cache.subscribe(|snapshot| debug!("view=refresh tasks={}", snapshot.len()));
    let mutation = args.command.is_mutation();

    let outcome = match run(&cache, args.command).await {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("❌ {e}");
            return ExitCode::from(1);
        }
    };
    view.unsubscribe();

    if let Some(message) = &outcome.message {
        if outcome.found {
            eprintln!("✅ {message}");
        } else {
            eprintln!("⚠️  {message}");
        }
    }

    if args.json {
        match render_json(&outcome.snapshot) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("❌ failed to serialize tasks: {e}");
                return ExitCode::from(1);
            }
        }
    } else if !mutation || outcome.found {
        println!("{}", render_text(&outcome.snapshot));
    }

    if outcome.found {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}
