//! Core domain models for the workflow engine — the *execution* shape of a
//! workflow graph, as opposed to `db::models`' *storage* shape. See
//! [`crate::graph`] for the transform between the two.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Trigger
// ---------------------------------------------------------------------------

/// How a workflow is started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Triggered by an incoming HTTP request to `/webhook/{path}`.
    Webhook {
        /// URL path segment that identifies this workflow.
        path: String,
    },
    /// Triggered manually via the REST API or the `workflow/execute.workflow` event.
    Manual,
    /// Triggered on a cron schedule.
    Cron {
        /// Standard cron expression (5 fields).
        expression: String,
    },
}

// ---------------------------------------------------------------------------
// NodeType
// ---------------------------------------------------------------------------

/// The closed set of node kinds the engine knows how to dispatch.
///
/// Extensible only by adding a variant and registering a matching
/// [`crate::registry::Registry`] entry — there is no hot-registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    /// Workflow entry point invoked by a user action. Outputs only.
    ManualTrigger,
    /// Placeholder entry used when a workflow is first created; execution
    /// semantics are identical to [`NodeType::ManualTrigger`].
    Initial,
    /// Makes one outbound HTTP call. Has both inputs and outputs.
    HttpRequest,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::ManualTrigger => "MANUAL_TRIGGER",
            NodeType::Initial => "INITIAL",
            NodeType::HttpRequest => "HTTP_REQUEST",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MANUAL_TRIGGER" => Ok(NodeType::ManualTrigger),
            "INITIAL" => Ok(NodeType::Initial),
            "HTTP_REQUEST" => Ok(NodeType::HttpRequest),
            other => Err(format!("unknown node type: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Canvas position. Opaque to the engine beyond round-tripping it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A vertex in the workflow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique within the workflow; generated client-side.
    pub id: String,
    pub node_type: NodeType,
    pub name: String,
    pub position: Position,
    /// Schema-less, executor-specific configuration. Validated at
    /// execution time, not at save time.
    pub data: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Edge (execution view of a connection)
// ---------------------------------------------------------------------------

/// Directed edge, execution-view field names (`source`/`target`/handles).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(default = "default_handle")]
    pub source_handle: String,
    #[serde(default = "default_handle")]
    pub target_handle: String,
}

pub(crate) fn default_handle() -> String {
    "main".to_string()
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// A complete workflow definition in execution-ready shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub trigger: Trigger,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    /// Convenience constructor for tests.
    pub fn new(
        name: impl Into<String>,
        user_id: Uuid,
        trigger: Trigger,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            user_id,
            trigger,
            nodes,
            edges,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build the single `INITIAL` node a freshly-created workflow is seeded with.
    pub fn seed_initial_node() -> Node {
        Node {
            id: Uuid::new_v4().to_string(),
            node_type: NodeType::Initial,
            name: NodeType::Initial.as_str().to_string(),
            position: Position::ORIGIN,
            data: serde_json::json!({}),
        }
    }
}
