use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "is_done")]
    pub is_done: bool,
    pub title: String,
    pub description: Option<String>,
    /// Epoch milliseconds of the last write
    #[sea_orm(column_name = "updated_at")]
    pub updated_at: i64,
    /// Epoch milliseconds the task is due, if scheduled
    #[sea_orm(column_name = "datetime_at")]
    pub due_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
