//! Workflow CRUD operations.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{models::WorkflowRow, DbError};

/// Create a new workflow owned by `user_id`. Starts with a manual trigger;
/// use [`set_trigger`] to change it.
pub async fn create_workflow(pool: &PgPool, user_id: Uuid, name: &str) -> Result<WorkflowRow, DbError> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let row = sqlx::query_as!(
        WorkflowRow,
        r#"
        INSERT INTO workflow (id, name, user_id, trigger_type, trigger_config, created_at, updated_at)
        VALUES ($1, $2, $3, 'manual', '{}'::jsonb, $4, $4)
        RETURNING id, name, user_id, trigger_type, trigger_config, created_at, updated_at
        "#,
        id,
        name,
        user_id,
        now,
    )
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetch a single workflow by its primary key, regardless of owner.
///
/// Callers that must enforce ownership should use [`get_owned_workflow`] —
/// kept separate so read paths that don't need an authorization decision
/// (e.g. webhook routing) aren't forced into one.
pub async fn get_workflow(pool: &PgPool, id: Uuid) -> Result<WorkflowRow, DbError> {
    let row = sqlx::query_as!(
        WorkflowRow,
        r#"SELECT id, name, user_id, trigger_type, trigger_config, created_at, updated_at FROM workflow WHERE id = $1"#,
        id,
    )
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Find the workflow whose webhook trigger matches `path`, if any.
///
/// Used by the inbound webhook handler to resolve `/webhook/{path}` to a
/// workflow without scanning every row's node graph.
pub async fn find_by_webhook_path(pool: &PgPool, path: &str) -> Result<Option<WorkflowRow>, DbError> {
    let row = sqlx::query_as!(
        WorkflowRow,
        r#"
        SELECT id, name, user_id, trigger_type, trigger_config, created_at, updated_at
        FROM workflow
        WHERE trigger_type = 'webhook' AND trigger_config ->> 'path' = $1
        "#,
        path,
    )
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Replace a workflow's trigger configuration.
pub async fn set_trigger(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    trigger_type: &str,
    trigger_config: serde_json::Value,
) -> Result<WorkflowRow, DbError> {
    get_owned_workflow(pool, id, user_id).await?;

    let row = sqlx::query_as!(
        WorkflowRow,
        r#"
        UPDATE workflow
        SET trigger_type = $1, trigger_config = $2, updated_at = $3
        WHERE id = $4
        RETURNING id, name, user_id, trigger_type, trigger_config, created_at, updated_at
        "#,
        trigger_type,
        trigger_config,
        Utc::now(),
        id,
    )
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetch a workflow and assert it belongs to `user_id`.
///
/// Returns `DbError::NotFound` if the workflow doesn't exist, and
/// `DbError::NotAuthorized` if it exists but belongs to someone else.
pub async fn get_owned_workflow(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<WorkflowRow, DbError> {
    let row = get_workflow(pool, id).await?;
    if row.user_id != user_id {
        return Err(DbError::NotAuthorized);
    }
    Ok(row)
}

/// Return all workflows owned by `user_id`, newest first.
pub async fn list_workflows(pool: &PgPool, user_id: Uuid) -> Result<Vec<WorkflowRow>, DbError> {
    let rows = sqlx::query_as!(
        WorkflowRow,
        r#"SELECT id, name, user_id, trigger_type, trigger_config, created_at, updated_at FROM workflow WHERE user_id = $1 ORDER BY created_at DESC"#,
        user_id,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Permanently delete a workflow by its primary key, if owned by `user_id`.
///
/// Cascades to `node` and `connection` via foreign-key constraints.
pub async fn delete_workflow(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<(), DbError> {
    get_owned_workflow(pool, id, user_id).await?;

    let result = sqlx::query!("DELETE FROM workflow WHERE id = $1", id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
