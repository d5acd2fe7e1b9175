//! Task repository: CRUD over the tasks table through the connection provider.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::adapters::tasks_sea as tasks_adapter;
pub use crate::adapters::tasks_sea::NewTask;
use crate::db::ConnectionProvider;
use crate::error::{StoreError, StoreOp};

/// Task domain model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub is_done: bool,
    /// Epoch milliseconds of the last create or update
    pub updated_at: i64,
    /// Epoch milliseconds, `None` when unscheduled
    pub due_at: Option<i64>,
}

impl Task {
    /// The writable fields of this task, for read-modify-write updates.
    pub fn to_new_task(&self) -> NewTask {
        NewTask {
            title: self.title.clone(),
            description: self.description.clone(),
            is_done: self.is_done,
            due_at: self.due_at,
        }
    }
}

impl From<crate::entities::tasks::Model> for Task {
    fn from(model: crate::entities::tasks::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            is_done: model.is_done,
            updated_at: model.updated_at,
            due_at: model.due_at,
        }
    }
}

/// Stateless access layer. Every call first asks the provider for a ready
/// handle; initialization failures pass through untouched.
#[derive(Clone)]
pub struct TaskStore {
    provider: Arc<ConnectionProvider>,
}

impl TaskStore {
    pub fn new(provider: Arc<ConnectionProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<ConnectionProvider> {
        &self.provider
    }

    /// All tasks by due date ascending, unscheduled tasks last.
    pub async fn list_all(&self) -> Result<Vec<Task>, StoreError> {
        let conn = self.provider.get_connection().await?;
        let rows = tasks_adapter::list_all(&*conn)
            .await
            .map_err(|e| op_error(StoreOp::ListAll, None, e))?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Task>, StoreError> {
        let conn = self.provider.get_connection().await?;
        let row = tasks_adapter::find_by_id(&*conn, id)
            .await
            .map_err(|e| op_error(StoreOp::GetById, Some(id), e))?;
        Ok(row.map(Task::from))
    }

    /// Returns the storage-assigned id.
    pub async fn insert(&self, task: NewTask) -> Result<i64, StoreError> {
        let conn = self.provider.get_connection().await?;
        let id = tasks_adapter::insert_task(&*conn, task)
            .await
            .map_err(|e| op_error(StoreOp::Insert, None, e))?;
        debug!("store=insert id={id}");
        Ok(id)
    }

    /// Returns the number of rows changed; 0 means `id` does not exist.
    pub async fn update(&self, id: i64, task: NewTask) -> Result<u64, StoreError> {
        let conn = self.provider.get_connection().await?;
        let affected = tasks_adapter::update_task(&*conn, id, task)
            .await
            .map_err(|e| op_error(StoreOp::Update, Some(id), e))?;
        debug!("store=update id={id} affected={affected}");
        Ok(affected)
    }

    /// Returns the number of rows removed; 0 means `id` does not exist.
    pub async fn delete(&self, id: i64) -> Result<u64, StoreError> {
        let conn = self.provider.get_connection().await?;
        let affected = tasks_adapter::delete_task(&*conn, id)
            .await
            .map_err(|e| op_error(StoreOp::Delete, Some(id), e))?;
        debug!("store=delete id={id} affected={affected}");
        Ok(affected)
    }

    pub async fn clear_all(&self) -> Result<(), StoreError> {
        let conn = self.provider.get_connection().await?;
        let removed = tasks_adapter::delete_all(&*conn)
            .await
            .map_err(|e| op_error(StoreOp::ClearAll, None, e))?;
        debug!("store=clear_all removed={removed}");
        Ok(())
    }
}

fn op_error(op: StoreOp, id: Option<i64>, err: sea_orm::DbErr) -> StoreError {
    warn!("store=op_failed op={op} id={id:?} err={err}");
    StoreError::operation(op, id, err)
}
