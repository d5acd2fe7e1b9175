//! SeaORM adapter for the tasks table.

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder, Set};
use time::OffsetDateTime;

use crate::entities::tasks;

pub mod dto;

pub use dto::NewTask;

// Adapter functions return DbErr; the repos layer attaches the operation context.

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// All rows by due date ascending. Rows without a due date sort last,
/// ties fall back to insertion order (id).
pub async fn list_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<tasks::Model>, sea_orm::DbErr> {
    tasks::Entity::find()
        .order_by_asc(Expr::col(tasks::Column::DueAt).is_null())
        .order_by_asc(tasks::Column::DueAt)
        .order_by_asc(tasks::Column::Id)
        .all(conn)
        .await
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Option<tasks::Model>, sea_orm::DbErr> {
    tasks::Entity::find_by_id(id).one(conn).await
}

/// Insert a row and return the id storage assigned to it.
pub async fn insert_task<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: NewTask,
) -> Result<i64, sea_orm::DbErr> {
    let task_active = tasks::ActiveModel {
        id: NotSet,
        is_done: Set(dto.is_done),
        title: Set(dto.title),
        description: Set(dto.description),
        updated_at: Set(now_millis()),
        due_at: Set(dto.due_at),
    };

    let res = tasks::Entity::insert(task_active).exec(conn).await?;
    Ok(res.last_insert_id)
}

/// Overwrite every mutable column of `id`. Returns the affected row count,
/// 0 when the row does not exist.
///
/// `updated_at` never moves backwards or stays put: a clock that has not
/// advanced since the previous write still yields previous + 1.
pub async fn update_task<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    dto: NewTask,
) -> Result<u64, sea_orm::DbErr> {
    let res = tasks::Entity::update_many()
        .col_expr(tasks::Column::Title, Expr::value(dto.title))
        .col_expr(tasks::Column::Description, Expr::value(dto.description))
        .col_expr(tasks::Column::IsDone, Expr::value(dto.is_done))
        .col_expr(tasks::Column::DueAt, Expr::value(dto.due_at))
        .col_expr(
            tasks::Column::UpdatedAt,
            Expr::cust_with_values(r#"MAX(?, "updated_at" + 1)"#, [now_millis()]),
        )
        .filter(tasks::Column::Id.eq(id))
        .exec(conn)
        .await?;

    Ok(res.rows_affected)
}

pub async fn delete_task<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<u64, sea_orm::DbErr> {
    let res = tasks::Entity::delete_by_id(id).exec(conn).await?;
    Ok(res.rows_affected)
}

pub async fn delete_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<u64, sea_orm::DbErr> {
    let res = tasks::Entity::delete_many().exec(conn).await?;
    Ok(res.rows_affected)
}
