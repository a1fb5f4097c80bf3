use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use db::repository::{executions as exec_repo, workflows as wf_repo};

use crate::auth::UserId;
use crate::error::{db_error_status, queue_error_status};
use crate::AppState;

#[derive(serde::Deserialize, Default)]
pub struct ExecuteWorkflowDto {
    #[serde(default)]
    pub input: Value,
}

/// Create a `pending` execution record and hand it to the job transport.
/// Actual node execution happens out-of-process, in the CLI `worker`.
pub async fn execute(
    UserId(user_id): UserId,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<ExecuteWorkflowDto>,
) -> Result<(StatusCode, Json<queue::Job>), StatusCode> {
    wf_repo::get_owned_workflow(&state.pool, id, user_id)
        .await
        .map_err(|e| db_error_status(&e))?;

    let exec = exec_repo::create_execution(&state.pool, id)
        .await
        .map_err(|e| db_error_status(&e))?;

    let job = state
        .queue
        .enqueue(exec.id, id, user_id, payload.input)
        .await
        .map_err(|e| queue_error_status(&e))?;

    Ok((StatusCode::ACCEPTED, Json(job)))
}
