//! `ManualTriggerNode` — the workflow entry-point executor.
//!
//! Registered for both `MANUAL_TRIGGER` and `INITIAL` node types: a
//! newly-created workflow's placeholder `INITIAL` node behaves identically
//! to a manual trigger at execution time.

use async_trait::async_trait;
use serde_json::Value;

use crate::context::Context;
use crate::status::{NodeStatus, StatusSink};
use crate::step::{thunk, StepRunner};
use crate::traits::ExecutableNode;
use crate::NodeError;

/// A no-op executor whose only job is to checkpoint the entry context so a
/// restart after the trigger fired does not re-observe the trigger event.
#[derive(Debug, Default)]
pub struct ManualTriggerNode;

#[async_trait]
impl ExecutableNode for ManualTriggerNode {
    async fn execute(
        &self,
        _data: &Value,
        node_id: &str,
        context: Context,
        step: &dyn StepRunner,
        status: &dyn StatusSink,
    ) -> Result<Context, NodeError> {
        status.emit(node_id, NodeStatus::Loading).await;

        let checkpointed = step
            .run("manual-trigger", thunk(move || async move { Ok(context.into_value()) }))
            .await;

        let result = match checkpointed {
            Ok(Value::Object(map)) => Ok(Context::from(map.into_iter().collect())),
            Ok(Value::Null) => Ok(Context::new()),
            Ok(other) => Err(NodeError::Fatal(format!(
                "manual trigger checkpoint returned a non-object value: {other}"
            ))),
            Err(e) => Err(e),
        };

        status
            .emit(node_id, if result.is_ok() { NodeStatus::Success } else { NodeStatus::Error })
            .await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{InMemoryStepRunner, RecordingStatusSink};
    use crate::status::NoopStatusSink;
    use serde_json::json;

    #[tokio::test]
    async fn passes_context_through_unchanged() {
        let node = ManualTriggerNode;
        let step = InMemoryStepRunner::new();
        let ctx = Context::from_initial_data(Some(json!({"seed": 1})));

        let out = node
            .execute(&Value::Null, "n1", ctx.clone(), &step, &NoopStatusSink)
            .await
            .unwrap();

        assert_eq!(out, ctx);
    }

    #[tokio::test]
    async fn checkpoints_exactly_once_per_name() {
        let node = ManualTriggerNode;
        let step = InMemoryStepRunner::new();
        let ctx = Context::from_initial_data(Some(json!({"seed": 1})));

        node.execute(&Value::Null, "n1", ctx.clone(), &step, &NoopStatusSink)
            .await
            .unwrap();
        node.execute(&Value::Null, "n1", ctx.clone(), &step, &NoopStatusSink)
            .await
            .unwrap();

        assert_eq!(step.call_count("manual-trigger"), 1);
    }

    #[tokio::test]
    async fn emits_loading_then_success() {
        let node = ManualTriggerNode;
        let step = InMemoryStepRunner::new();
        let status = RecordingStatusSink::new();
        let ctx = Context::new();

        node.execute(&Value::Null, "n1", ctx, &step, &status).await.unwrap();

        assert_eq!(status.transitions("n1"), vec![NodeStatus::Loading, NodeStatus::Success]);
    }
}
