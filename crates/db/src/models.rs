//! Row structs that map 1-to-1 onto database tables.
//!
//! These are *persistence* models — they carry no domain behaviour.
//! Domain types live in the `engine` crate; see `engine::graph` for the
//! transform between these rows and `engine::models`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// workflows
// ---------------------------------------------------------------------------

/// A persisted workflow row.
///
/// Trigger configuration lives directly on the workflow, not inside the
/// node/connection graph — a workflow has exactly one way to start, and
/// storing it alongside `name` keeps webhook routing a single indexed
/// lookup rather than a join into `node`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkflowRow {
    pub id: Uuid,
    pub name: String,
    /// Owning user. Deletion of this row cascades to `node` and `connection`.
    pub user_id: Uuid,
    /// `"webhook"`, `"manual"`, or `"cron"`.
    pub trigger_type: String,
    /// `{}` for manual, `{"path": ...}` for webhook, `{"expression": ...}` for cron.
    pub trigger_config: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// node
// ---------------------------------------------------------------------------

/// A persisted node row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NodeRow {
    /// Client-supplied identifier, stable across saves. Not a UUID — nodes
    /// are created offline in the editor before the workflow is persisted.
    pub id: String,
    pub workflow_id: Uuid,
    pub name: String,
    pub node_type: String,
    /// `{"x": f64, "y": f64}`, opaque to the engine.
    pub position: serde_json::Value,
    /// Executor-specific configuration, opaque until execution time.
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// connection
// ---------------------------------------------------------------------------

/// A persisted connection (directed edge) row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConnectionRow {
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub from_node_id: String,
    pub to_node_id: String,
    pub from_output: String,
    pub to_input: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// workflow_executions
// ---------------------------------------------------------------------------

/// A persisted workflow execution row. `status` is one of `"pending"`,
/// `"running"`, `"succeeded"`, `"failed"` — see
/// `db::repository::executions` for the transitions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkflowExecutionRow {
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// node_executions
// ---------------------------------------------------------------------------

/// A persisted node execution row (one per node, per execution attempt).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NodeExecutionRow {
    pub id: Uuid,
    pub execution_id: Uuid,
    pub node_id: String,
    pub input: serde_json::Value,
    pub output: Option<serde_json::Value>,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// step_checkpoints
// ---------------------------------------------------------------------------

/// A durable checkpoint for one `step.run(name, ...)` call within one
/// execution. Unique on `(execution_id, name)` — this is what gives
/// `step.run` its "at most once" semantics across process restarts.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StepCheckpointRow {
    pub execution_id: Uuid,
    pub name: String,
    pub value: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// job_queue
// ---------------------------------------------------------------------------

/// A job row fetched from the queue table — the Postgres-backed stand-in
/// for the out-of-scope at-least-once transport. `status` is one of
/// `"pending"`, `"processing"`, `"completed"`, `"pending"` (retried), or
/// `"dead_lettered"` — see `db::repository::jobs`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub execution_id: Uuid,
    pub workflow_id: Uuid,
    pub owner_id: Uuid,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
