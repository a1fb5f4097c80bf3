//! Node read operations. Writes happen only through [`crate::repository::graph::save_graph`],
//! which replaces a workflow's whole node set atomically.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{models::NodeRow, DbError};

/// List all nodes belonging to `workflow_id`, in no particular order —
/// execution order is the scheduler's job, not storage's.
pub async fn list_nodes(pool: &PgPool, workflow_id: Uuid) -> Result<Vec<NodeRow>, DbError> {
    let rows = sqlx::query_as!(
        NodeRow,
        r#"
        SELECT id, workflow_id, name, node_type, position, data, created_at, updated_at
        FROM node
        WHERE workflow_id = $1
        "#,
        workflow_id,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
