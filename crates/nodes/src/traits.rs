//! The `ExecutableNode` trait — the contract every node must fulfil.

use async_trait::async_trait;
use serde_json::Value;

use crate::context::Context;
use crate::status::StatusSink;
use crate::step::StepRunner;
use crate::NodeError;

/// The core node trait.
///
/// All built-in nodes and future plugin nodes must implement this. The
/// parameters mirror a node's five inputs: its own configuration (`data`),
/// its own id (used in error messages and step names), the incoming
/// [`Context`], the durability [`StepRunner`], and the [`StatusSink`] it
/// must emit `loading`/`success`/`error` transitions to.
///
/// Implementations must return a context that is a superset of or
/// replacement for `context` — never mutate it in place (it is passed
/// by value specifically so there is nothing in-place to mutate).
#[async_trait]
pub trait ExecutableNode: Send + Sync {
    /// Execute the node and return the outgoing context.
    async fn execute(
        &self,
        data: &Value,
        node_id: &str,
        context: Context,
        step: &dyn StepRunner,
        status: &dyn StatusSink,
    ) -> Result<Context, NodeError>;
}
