//! Engine-level error types.
//!
//! Every variant is classified retriable or not via [`EngineError::is_retriable`],
//! which is the contract the out-of-scope job transport relies on: it retries
//! retriable failures per its backoff policy and reports everything else once,
//! with no retry.

use nodes::NodeError;
use thiserror::Error;

/// Errors produced by the workflow engine (graph validation + execution).
#[derive(Debug, Error)]
pub enum EngineError {
    // ------ Validation errors (raised while loading/sorting the graph) ------
    /// Two or more nodes share the same ID.
    #[error("duplicate node ID: '{0}'")]
    DuplicateNodeId(String),

    /// An edge references a node ID that doesn't exist in the workflow.
    #[error("edge references unknown node '{node_id}' ({side} side)")]
    UnknownNodeReference { node_id: String, side: &'static str },

    /// Topological sort detected a cycle. Non-retriable; no node runs.
    #[error("workflow graph contains a cycle")]
    CycleError,

    /// Missing/invalid configuration: unknown node type, missing
    /// `workflowId`, unregistered executor, or a node's own schema
    /// violation surfaced through [`NodeError::Fatal`].
    #[error("configuration error: {0}")]
    ConfigError(String),

    // ------ Persistence / authorization errors ------
    /// The workflow doesn't exist, or doesn't belong to the caller.
    #[error("workflow not found")]
    NotFound,

    /// The caller isn't the workflow's owner.
    #[error("caller is not authorized for this workflow")]
    NotAuthorized,

    // ------ Execution errors ------
    /// A node failed fatally; the whole execution is aborted, no retry.
    #[error("node '{node_id}' failed fatally: {message}")]
    NodeFatal { node_id: String, message: String },

    /// A node failed with a transient error; the transport should retry
    /// the whole execution (duplicate work is expected and absorbed by
    /// `step.run` checkpointing).
    #[error("node '{node_id}' failed transiently: {message}")]
    TransientError { node_id: String, message: String },

    /// Persistence error from the db crate (connection/migration failure —
    /// `DbError::NotFound`/`NotAuthorized` are lifted to their own variants
    /// above instead, see the `From<db::DbError>` impl below).
    #[error("database error: {0}")]
    Database(db::DbError),
}

impl From<db::DbError> for EngineError {
    /// `NotFound`/`NotAuthorized` carry their own non-retriable kinds — a
    /// workflow deleted or reassigned between enqueue and poll must not be
    /// retried. Everything else (connection drop, migration failure) stays
    /// `Database` and defaults to retriable.
    fn from(err: db::DbError) -> Self {
        match err {
            db::DbError::NotFound => EngineError::NotFound,
            db::DbError::NotAuthorized => EngineError::NotAuthorized,
            other => EngineError::Database(other),
        }
    }
}

impl EngineError {
    /// Whether the out-of-scope transport should retry the execution that
    /// produced this error. Per spec §7, every kind defaults to retriable
    /// except the explicitly non-retriable ones (config, cycle, ownership,
    /// not-found, and fatal node failures).
    pub fn is_retriable(&self) -> bool {
        !matches!(
            self,
            EngineError::ConfigError(_)
                | EngineError::CycleError
                | EngineError::NotFound
                | EngineError::NotAuthorized
                | EngineError::NodeFatal { .. }
                | EngineError::DuplicateNodeId(_)
                | EngineError::UnknownNodeReference { .. }
        )
    }

    /// Lift a node's own error into the engine's error vocabulary.
    pub fn from_node_error(node_id: &str, err: NodeError) -> Self {
        match err {
            NodeError::Fatal(message) => EngineError::NodeFatal {
                node_id: node_id.to_string(),
                message,
            },
            NodeError::Retryable(message) => EngineError::TransientError {
                node_id: node_id.to_string(),
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_db_error_maps_to_not_found_and_is_non_retriable() {
        let err = EngineError::from(db::DbError::NotFound);
        assert!(matches!(err, EngineError::NotFound));
        assert!(!err.is_retriable());
    }

    #[test]
    fn not_authorized_db_error_maps_to_not_authorized_and_is_non_retriable() {
        let err = EngineError::from(db::DbError::NotAuthorized);
        assert!(matches!(err, EngineError::NotAuthorized));
        assert!(!err.is_retriable());
    }

    #[test]
    fn cycle_error_is_non_retriable() {
        assert!(!EngineError::CycleError.is_retriable());
    }
}
