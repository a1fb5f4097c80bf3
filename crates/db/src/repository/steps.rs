//! `step_checkpoints` repository — the durability backing for `step.run`.
//!
//! A checkpoint is written at most once per `(execution_id, name)`; a
//! conflicting insert is treated as "already checkpointed" rather than an
//! error, since it's the expected shape of a re-delivered job replaying a
//! step it already completed.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{models::StepCheckpointRow, DbError};

/// Fetch a previously recorded checkpoint, if one exists.
pub async fn get_checkpoint(
    pool: &PgPool,
    execution_id: Uuid,
    name: &str,
) -> Result<Option<StepCheckpointRow>, DbError> {
    let row = sqlx::query_as!(
        StepCheckpointRow,
        r#"
        SELECT execution_id, name, value, created_at
        FROM step_checkpoints
        WHERE execution_id = $1 AND name = $2
        "#,
        execution_id,
        name,
    )
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Record a checkpoint's result. If `(execution_id, name)` already has a
/// row, the existing value wins and is returned instead — this is what
/// makes `step.run` idempotent across retries.
pub async fn put_checkpoint(
    pool: &PgPool,
    execution_id: Uuid,
    name: &str,
    value: serde_json::Value,
) -> Result<StepCheckpointRow, DbError> {
    let row = sqlx::query_as!(
        StepCheckpointRow,
        r#"
        INSERT INTO step_checkpoints (execution_id, name, value, created_at)
        VALUES ($1, $2, $3, now())
        ON CONFLICT (execution_id, name) DO UPDATE SET name = step_checkpoints.name
        RETURNING execution_id, name, value, created_at
        "#,
        execution_id,
        name,
        value,
    )
    .fetch_one(pool)
    .await?;

    Ok(row)
}
