//! Test logging bootstrap for the task store's unit and integration tests.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Filter used when neither `TEST_LOG` nor `RUST_LOG` is set. SQLx statement
/// logging stays off even when the store's own targets are turned up.
const DEFAULT_FILTER: &str = "warn,sqlx=off";

/// Install a test-writer subscriber once per test binary.
///
/// Precedence: `TEST_LOG`, then `RUST_LOG`, then [`DEFAULT_FILTER`].
/// Safe to call from every test and from `ctor` hooks; a subscriber installed
/// by someone else first is left in place.
///
/// ```bash
/// TEST_LOG=tasks=debug cargo test -p tasks
/// ```
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}
