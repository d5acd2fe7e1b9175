use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter: quiet CLI output, store internals available via `RUST_LOG=tasks=debug`.
const DEFAULT_FILTER: &str = "warn,sqlx=warn,sea_orm=warn";

/// Install the process-wide subscriber. `TASKS_LOG_FORMAT=json` switches to
/// structured JSON lines; logs always go to stderr so stdout stays parseable.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let json = std::env::var("TASKS_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(false);

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(base.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(base.without_time())
            .init();
    }
}
