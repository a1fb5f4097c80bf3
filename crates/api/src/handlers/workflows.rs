use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use db::models::{NodeRow, WorkflowRow};
use db::repository::{graph as graph_repo, workflows as wf_repo};
use engine::graph::{to_execution_graph, trigger_to_row_fields};

use crate::auth::UserId;
use crate::error::db_error_status;
use crate::AppState;

#[derive(serde::Deserialize)]
pub struct CreateWorkflowDto {
    pub name: String,
}

/// A freshly created workflow is seeded with a single `INITIAL` node,
/// matching the editor's "new canvas" lifecycle.
async fn seed_initial_node(pool: &db::DbPool, workflow: &WorkflowRow) -> Result<NodeRow, db::DbError> {
    let seed = engine::Workflow::seed_initial_node();
    let (_, mut nodes, _) = graph_repo::save_graph(
        pool,
        workflow.id,
        workflow.user_id,
        vec![graph_repo::NodeInput {
            id: seed.id,
            name: Some(seed.name),
            node_type: seed.node_type.to_string(),
            position: serde_json::to_value(seed.position).unwrap(),
            data: seed.data,
        }],
        vec![],
    )
    .await?;
    Ok(nodes.remove(0))
}

pub async fn list(
    UserId(user_id): UserId,
    State(state): State<AppState>,
) -> Result<Json<Vec<WorkflowRow>>, StatusCode> {
    wf_repo::list_workflows(&state.pool, user_id)
        .await
        .map(Json)
        .map_err(|e| db_error_status(&e))
}

pub async fn get(
    UserId(user_id): UserId,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<engine::Workflow>, StatusCode> {
    let (workflow_row, node_rows, connection_rows) = graph_repo::load_graph(&state.pool, id, user_id)
        .await
        .map_err(|e| db_error_status(&e))?;

    let workflow = to_execution_graph(workflow_row, node_rows, connection_rows)
        .map_err(|e| crate::error::engine_error_status(&e))?;

    Ok(Json(workflow))
}

pub async fn create(
    UserId(user_id): UserId,
    State(state): State<AppState>,
    Json(payload): Json<CreateWorkflowDto>,
) -> Result<(StatusCode, Json<engine::Workflow>), StatusCode> {
    let workflow_row = wf_repo::create_workflow(&state.pool, user_id, &payload.name)
        .await
        .map_err(|e| db_error_status(&e))?;

    let node_row = seed_initial_node(&state.pool, &workflow_row)
        .await
        .map_err(|e| db_error_status(&e))?;

    let workflow = to_execution_graph(workflow_row, vec![node_row], vec![])
        .map_err(|e| crate::error::engine_error_status(&e))?;

    Ok((StatusCode::CREATED, Json(workflow)))
}

pub async fn delete(
    UserId(user_id): UserId,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, StatusCode> {
    wf_repo::delete_workflow(&state.pool, id, user_id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|e| db_error_status(&e))
}

pub async fn set_trigger(
    UserId(user_id): UserId,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(trigger): Json<engine::Trigger>,
) -> Result<Json<WorkflowRow>, StatusCode> {
    let (trigger_type, trigger_config) = trigger_to_row_fields(&trigger);

    wf_repo::set_trigger(&state.pool, id, user_id, trigger_type, trigger_config)
        .await
        .map(Json)
        .map_err(|e| db_error_status(&e))
}
