use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use db::repository::graph as graph_repo;
use engine::graph::to_execution_graph;

use crate::auth::UserId;
use crate::error::{db_error_status, engine_error_status};
use crate::AppState;

#[derive(Deserialize)]
pub struct NodeDto {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub node_type: String,
    pub position: serde_json::Value,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Deserialize)]
pub struct EdgeDto {
    pub source: String,
    pub target: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
}

/// Full-replace save: the editor sends its entire current node/edge set,
/// and the stored graph for this workflow is replaced with exactly that —
/// not merged, not diffed.
#[derive(Deserialize)]
pub struct SaveGraphDto {
    pub nodes: Vec<NodeDto>,
    pub edges: Vec<EdgeDto>,
}

pub async fn save(
    UserId(user_id): UserId,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<SaveGraphDto>,
) -> Result<Json<engine::Workflow>, StatusCode> {
    let node_inputs = payload
        .nodes
        .into_iter()
        .map(|n| graph_repo::NodeInput {
            id: n.id,
            name: n.name,
            node_type: n.node_type,
            position: n.position,
            data: n.data,
        })
        .collect();

    let edge_inputs = payload
        .edges
        .into_iter()
        .map(|e| graph_repo::EdgeInput {
            source: e.source,
            target: e.target,
            source_handle: e.source_handle,
            target_handle: e.target_handle,
        })
        .collect();

    let (workflow_row, node_rows, connection_rows) =
        graph_repo::save_graph(&state.pool, id, user_id, node_inputs, edge_inputs)
            .await
            .map_err(|e| db_error_status(&e))?;

    let workflow = to_execution_graph(workflow_row, node_rows, connection_rows)
        .map_err(|e| engine_error_status(&e))?;

    Ok(Json(workflow))
}
