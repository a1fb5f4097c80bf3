//! Status-transition emission points.
//!
//! Spec §9's "executor status emission" open question: the real-time
//! publication channel to the UI is out of scope, but the *points* at which
//! an executor must emit a transition are normative — `loading` before its
//! principal [`crate::step::StepRunner::run`] call, `success`/`error` after
//! it. [`StatusSink`] models that channel as an injected dependency, the
//! same way [`crate::step::StepRunner`] models the durability transport:
//! testable in isolation, and a no-op when nothing downstream is listening.

use async_trait::async_trait;

/// One node's status within a single execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    /// Emitted once, before the node's principal `step.run` call.
    Loading,
    /// Emitted once, after the node returns its outgoing context.
    Success,
    /// Emitted once, if the node's execution fails.
    Error,
}

/// Receives per-node status transitions. The out-of-scope real-time
/// channel would implement this by publishing to connected UI clients.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn emit(&self, node_id: &str, status: NodeStatus);
}

/// A [`StatusSink`] that discards every transition — the default when no
/// real-time channel is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStatusSink;

#[async_trait]
impl StatusSink for NoopStatusSink {
    async fn emit(&self, _node_id: &str, _status: NodeStatus) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_sink_accepts_any_transition() {
        let sink = NoopStatusSink;
        sink.emit("n1", NodeStatus::Loading).await;
        sink.emit("n1", NodeStatus::Success).await;
        sink.emit("n1", NodeStatus::Error).await;
    }
}
