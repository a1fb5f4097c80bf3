//! Connection read operations. Writes happen only through
//! [`crate::repository::graph::save_graph`].

use sqlx::PgPool;
use uuid::Uuid;

use crate::{models::ConnectionRow, DbError};

/// List all connections belonging to `workflow_id`.
pub async fn list_connections(pool: &PgPool, workflow_id: Uuid) -> Result<Vec<ConnectionRow>, DbError> {
    let rows = sqlx::query_as!(
        ConnectionRow,
        r#"
        SELECT id, workflow_id, from_node_id, to_node_id, from_output, to_input, created_at, updated_at
        FROM connection
        WHERE workflow_id = $1
        "#,
        workflow_id,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
