use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use db::repository::{executions as exec_repo, workflows as wf_repo};

use crate::error::{db_error_status, queue_error_status};
use crate::AppState;

/// Resolve `path` to a workflow whose trigger is `Webhook { path }` and
/// enqueue an execution for it. Unlike the authenticated workflow routes,
/// this one has no caller identity to check — the workflow's own owner is
/// used to enqueue the job on the caller's behalf.
pub async fn handle_webhook(
    Path(path): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let workflow = wf_repo::find_by_webhook_path(&state.pool, &path)
        .await
        .map_err(|e| db_error_status(&e))?
        .ok_or(StatusCode::NOT_FOUND)?;

    let exec = exec_repo::create_execution(&state.pool, workflow.id)
        .await
        .map_err(|e| db_error_status(&e))?;

    state
        .queue
        .enqueue(exec.id, workflow.id, workflow.user_id, payload)
        .await
        .map_err(|e| queue_error_status(&e))?;

    Ok((StatusCode::ACCEPTED, Json(serde_json::json!({ "message": "webhook accepted" }))))
}
