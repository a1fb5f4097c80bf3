//! Atomic load/save of a workflow's node-and-connection graph.
//!
//! The save endpoint (spec'd as full-graph replacement, not a diff) is the
//! one place in this crate that needs a transaction spanning more than a
//! single statement: delete-then-reinsert has to be all-or-nothing, or a
//! crash between the delete and the inserts leaves an empty workflow.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    models::{ConnectionRow, NodeRow, WorkflowRow},
    repository::{connections, nodes, workflows},
    DbError,
};

/// One node as submitted by a save-graph request.
#[derive(Debug, Clone)]
pub struct NodeInput {
    pub id: String,
    pub name: Option<String>,
    pub node_type: String,
    pub position: serde_json::Value,
    pub data: serde_json::Value,
}

/// One connection as submitted by a save-graph request.
#[derive(Debug, Clone)]
pub struct EdgeInput {
    pub source: String,
    pub target: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
}

/// Load a workflow plus its full node/connection graph, if owned by `user_id`.
pub async fn load_graph(
    pool: &PgPool,
    workflow_id: Uuid,
    user_id: Uuid,
) -> Result<(WorkflowRow, Vec<NodeRow>, Vec<ConnectionRow>), DbError> {
    let workflow = workflows::get_owned_workflow(pool, workflow_id, user_id).await?;
    let node_rows = nodes::list_nodes(pool, workflow_id).await?;
    let connection_rows = connections::list_connections(pool, workflow_id).await?;
    Ok((workflow, node_rows, connection_rows))
}

/// Replace a workflow's entire node and connection set in one transaction.
///
/// Deleting `node` rows cascades to `connection` via the foreign key, so
/// the delete step below only needs to target `node`.
pub async fn save_graph(
    pool: &PgPool,
    workflow_id: Uuid,
    user_id: Uuid,
    node_inputs: Vec<NodeInput>,
    edge_inputs: Vec<EdgeInput>,
) -> Result<(WorkflowRow, Vec<NodeRow>, Vec<ConnectionRow>), DbError> {
    workflows::get_owned_workflow(pool, workflow_id, user_id).await?;

    let mut tx = pool.begin().await?;
    let now = chrono::Utc::now();

    sqlx::query!("DELETE FROM node WHERE workflow_id = $1", workflow_id)
        .execute(&mut *tx)
        .await?;

    let mut inserted_nodes = Vec::with_capacity(node_inputs.len());
    for input in &node_inputs {
        let name = input
            .name
            .clone()
            .unwrap_or_else(|| input.node_type.clone());

        let row = sqlx::query_as!(
            NodeRow,
            r#"
            INSERT INTO node (id, workflow_id, name, node_type, position, data, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING id, workflow_id, name, node_type, position, data, created_at, updated_at
            "#,
            input.id,
            workflow_id,
            name,
            input.node_type,
            input.position,
            input.data,
            now,
        )
        .fetch_one(&mut *tx)
        .await?;
        inserted_nodes.push(row);
    }

    let mut inserted_edges = Vec::with_capacity(edge_inputs.len());
    for input in &edge_inputs {
        let id = Uuid::new_v4();
        let source_handle = input.source_handle.clone().unwrap_or_else(|| "main".into());
        let target_handle = input.target_handle.clone().unwrap_or_else(|| "main".into());

        let row = sqlx::query_as!(
            ConnectionRow,
            r#"
            INSERT INTO connection (id, workflow_id, from_node_id, to_node_id, from_output, to_input, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING id, workflow_id, from_node_id, to_node_id, from_output, to_input, created_at, updated_at
            "#,
            id,
            workflow_id,
            input.source,
            input.target,
            source_handle,
            target_handle,
            now,
        )
        .fetch_one(&mut *tx)
        .await?;
        inserted_edges.push(row);
    }

    sqlx::query!(
        "UPDATE workflow SET updated_at = $1 WHERE id = $2",
        now,
        workflow_id,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let workflow = workflows::get_workflow(pool, workflow_id).await?;
    Ok((workflow, inserted_nodes, inserted_edges))
}
