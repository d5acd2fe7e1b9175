use std::fmt::{Display, Formatter, Result as FmtResult};

use db_infra::DbInfraError;
use thiserror::Error;

/// The storage statement a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListAll,
    GetById,
    Insert,
    Update,
    Delete,
    ClearAll,
}

impl StoreOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreOp::ListAll => "list_all",
            StoreOp::GetById => "get_by_id",
            StoreOp::Insert => "insert",
            StoreOp::Update => "update",
            StoreOp::Delete => "delete",
            StoreOp::ClearAll => "clear_all",
        }
    }
}

impl Display for StoreOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the task store and everything layered on it.
///
/// A missing record is never an error: lookups return `None` and
/// update/delete report zero affected rows.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// Storage could not be opened or its schema created. Retryable.
    #[error("Initialization error: {detail}")]
    Initialization { detail: String },
    /// A single statement failed. Not retried.
    #[error("Storage operation {op} failed{}: {detail}", id_suffix(.id))]
    Operation {
        op: StoreOp,
        id: Option<i64>,
        detail: String,
    },
}

fn id_suffix(id: &Option<i64>) -> String {
    id.map(|id| format!(" for id {id}")).unwrap_or_default()
}

impl StoreError {
    pub fn initialization(detail: impl Into<String>) -> Self {
        Self::Initialization {
            detail: detail.into(),
        }
    }

    pub fn operation(op: StoreOp, id: Option<i64>, err: impl Display) -> Self {
        Self::Operation {
            op,
            id,
            detail: err.to_string(),
        }
    }

    pub fn is_initialization(&self) -> bool {
        matches!(self, StoreError::Initialization { .. })
    }

    /// Operation kind for statement failures, `None` for initialization failures.
    pub fn op(&self) -> Option<StoreOp> {
        match self {
            StoreError::Operation { op, .. } => Some(*op),
            StoreError::Initialization { .. } => None,
        }
    }
}

impl From<DbInfraError> for StoreError {
    fn from(e: DbInfraError) -> Self {
        StoreError::initialization(e.to_string())
    }
}
