//! Test support utilities shared by the workspace's test binaries:
//! logging bootstrap, unique test data and throwaway SQLite files.

pub mod logging;

use std::path::PathBuf;

use tempfile::TempDir;
use ulid::Ulid;

/// Generate a unique string with the given prefix
///
/// # Examples
/// ```
/// use tasks_test_support::unique_str;
///
/// let a = unique_str("task");
/// let b = unique_str("task");
/// assert_ne!(a, b);
/// assert!(a.starts_with("task-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// A SQLite file inside a private temp directory. The directory (and with it
/// the database, WAL and SHM files) is removed on drop.
pub struct TempDbFile {
    dir: TempDir,
    path: PathBuf,
}

impl TempDbFile {
    pub fn new() -> Self {
        let dir = tempfile::Builder::new()
            .prefix("tasks-test-")
            .tempdir()
            .expect("create temp dir for sqlite file");
        let path = dir.path().join(format!("{}.db", unique_str("tasks")));
        Self { dir, path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn path_string(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    pub fn dir(&self) -> &std::path::Path {
        self.dir.path()
    }
}

impl Default for TempDbFile {
    fn default() -> Self {
        Self::new()
    }
}
