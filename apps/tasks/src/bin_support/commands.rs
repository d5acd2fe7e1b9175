//! Task commands: each one drives the cache the way a view layer would.

use clap::Subcommand;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::adapters::tasks_sea::now_millis;
use crate::error::StoreError;
use crate::repos::tasks::{NewTask, Task};
use crate::services::task_cache::{TaskCache, TaskSnapshot};

const DAY_MS: i64 = 86_400_000;

/// Largest `--due-in-days` offset accepted in either direction, about a century.
pub const MAX_DUE_DAYS: i64 = 36_500;

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Show every task, soonest due first
    List,
    /// Create a task
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Due this many days from now
        #[arg(
            long,
            allow_negative_numbers = true,
            value_parser = clap::value_parser!(i64).range(-MAX_DUE_DAYS..=MAX_DUE_DAYS)
        )]
        due_in_days: Option<i64>,
    },
    /// Mark a task done
    Done { id: i64 },
    /// Mark a task not done
    Undo { id: i64 },
    /// Change fields of a task; omitted fields keep their value
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(
            long,
            conflicts_with = "clear_due",
            allow_negative_numbers = true,
            value_parser = clap::value_parser!(i64).range(-MAX_DUE_DAYS..=MAX_DUE_DAYS)
        )]
        due_in_days: Option<i64>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },
    /// Delete a task
    Remove { id: i64 },
    /// Delete every task
    Clear,
}

impl Command {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Command::List)
    }
}

/// What a command did, plus the snapshot it left behind.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub message: Option<String>,
    /// False when the target id did not exist
    pub found: bool,
    pub snapshot: TaskSnapshot,
}

/// Run `command` against `cache`. The cache is loaded first so lookups by id
/// see current storage.
pub async fn run(cache: &TaskCache, command: Command) -> Result<CommandOutcome, StoreError> {
    cache.reload().await?;

    let (message, found) = match command {
        Command::List => (None, true),
        Command::Add {
            title,
            description,
            due_in_days,
        } => {
            let mut task = NewTask::new(title);
            task.description = description;
            task.due_at = due_in_days.map(due_from_now);
            let id = cache.create(task).await?;
            (Some(format!("added task {id}")), true)
        }
        Command::Done { id } => set_done(cache, id, true).await?,
        Command::Undo { id } => set_done(cache, id, false).await?,
        Command::Edit {
            id,
            title,
            description,
            due_in_days,
            clear_due,
        } => match find(cache, id) {
            Some(existing) => {
                let mut task = existing.to_new_task();
                if let Some(title) = title {
                    task.title = title;
                }
                if let Some(description) = description {
                    task.description = Some(description);
                }
                if clear_due {
                    task.due_at = None;
                } else if let Some(days) = due_in_days {
                    task.due_at = Some(due_from_now(days));
                }
                let affected = cache.update_by_id(id, task).await?;
                affected_message(id, affected, "updated")
            }
            None => not_found(id),
        },
        Command::Remove { id } => {
            let affected = cache.delete_by_id(id).await?;
            affected_message(id, affected, "removed")
        }
        Command::Clear => {
            cache.clear_all().await?;
            (Some("cleared all tasks".to_string()), true)
        }
    };

    Ok(CommandOutcome {
        message,
        found,
        snapshot: cache.snapshot(),
    })
}

async fn set_done(
    cache: &TaskCache,
    id: i64,
    is_done: bool,
) -> Result<(Option<String>, bool), StoreError> {
    let Some(existing) = find(cache, id) else {
        return Ok(not_found(id));
    };
    let affected = cache
        .update_by_id(id, existing.to_new_task().with_done(is_done))
        .await?;
    let verb = if is_done { "completed" } else { "reopened" };
    Ok(affected_message(id, affected, verb))
}

fn find(cache: &TaskCache, id: i64) -> Option<Task> {
    cache.snapshot().iter().find(|t| t.id == id).cloned()
}

fn affected_message(id: i64, affected: u64, verb: &str) -> (Option<String>, bool) {
    if affected == 0 {
        not_found(id)
    } else {
        (Some(format!("{verb} task {id}")), true)
    }
}

fn not_found(id: i64) -> (Option<String>, bool) {
    (Some(format!("task {id} not found")), false)
}

// Saturates for callers that bypass the clap range check.
fn due_from_now(days: i64) -> i64 {
    now_millis().saturating_add(days.saturating_mul(DAY_MS))
}

/// Plain-text listing, one task per line.
pub fn render_text(snapshot: &[Task]) -> String {
    if snapshot.is_empty() {
        return "no tasks".to_string();
    }

    snapshot
        .iter()
        .map(|task| {
            let mark = if task.is_done { "x" } else { " " };
            let due = task
                .due_at
                .map(|ms| format!("  (due {})", format_day(ms)))
                .unwrap_or_default();
            let description = task
                .description
                .as_deref()
                .map(|d| format!("\n       {d}"))
                .unwrap_or_default();
            format!("[{mark}] {:>3}  {}{due}{description}", task.id, task.title)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_json(snapshot: &[Task]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snapshot)
}

fn format_day(ms: i64) -> String {
    let format = format_description!("[year]-[month]-[day]");
    OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * 1_000_000)
        .ok()
        .and_then(|dt| dt.format(&format).ok())
        .unwrap_or_else(|| ms.to_string())
}
