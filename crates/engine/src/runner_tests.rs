//! Integration-style tests for node-pipeline execution.
//!
//! These exercise the same sequencing [`crate::runner::WorkflowRunner`] uses
//! internally — topological sort, then dispatch each node in order, threading
//! a single [`Context`] through — without needing a live Postgres pool. The
//! runner itself talks to `db` directly via `sqlx`, so tests that need a
//! real database belong in `tests/integration/`.

use std::collections::HashMap;

use serde_json::json;

use crate::dag::topological_sort;
use crate::models::{Edge, Node, NodeType, Position};
use nodes::mock::{AlwaysFailingStepRunner, InMemoryStepRunner, MockNode};
use nodes::{Context, ExecutableNode, NodeError, NoopStatusSink};

fn mock_node(id: &str) -> Node {
    Node {
        id: id.to_string(),
        node_type: NodeType::Initial,
        name: id.to_string(),
        position: Position::ORIGIN,
        data: json!({}),
    }
}

fn linear_nodes(ids: &[&str]) -> (Vec<Node>, Vec<Edge>) {
    let nodes = ids.iter().map(|id| mock_node(id)).collect();
    let edges = ids
        .windows(2)
        .map(|w| Edge {
            source: w[0].to_string(),
            target: w[1].to_string(),
            source_handle: "main".to_string(),
            target_handle: "main".to_string(),
        })
        .collect();
    (nodes, edges)
}

#[tokio::test]
async fn three_node_pipeline_threads_context_through_nodes() {
    let (nodes, edges) = linear_nodes(&["node_a", "node_b", "node_c"]);
    let sorted = topological_sort(&nodes, &edges).expect("valid dag");

    let a = MockNode::returning("node_a", json!({ "step": 1 }));
    let b = MockNode::returning("node_b", json!({ "step": 2 }));
    let c = MockNode::returning("node_c", json!({ "step": 3 }));
    let registry: HashMap<&str, &MockNode> =
        [("node_a", &a), ("node_b", &b), ("node_c", &c)].into_iter().collect();

    let step = InMemoryStepRunner::new();
    let mut context = Context::from_initial_data(Some(json!({ "origin": "trigger" })));

    let mut order = Vec::new();
    for node in &sorted {
        let mock = registry[node.id.as_str()];
        let next = mock
            .execute(&node.data, &node.id, context.clone(), &step, &NoopStatusSink)
            .await
            .expect("mock node should succeed");

        assert!(context.is_subset_of(&next), "context must grow monotonically");
        context = next;
        order.push(node.id.clone());
    }

    assert_eq!(order, vec!["node_a", "node_b", "node_c"]);
    assert_eq!(a.call_count(), 1);
    assert_eq!(b.call_count(), 1);
    assert_eq!(c.call_count(), 1);

    assert_eq!(context.get("origin"), Some(&json!("trigger")));
    assert_eq!(context.get("node_a"), Some(&json!({ "step": 1 })));
    assert_eq!(context.get("node_c"), Some(&json!({ "step": 3 })));
}

#[tokio::test]
async fn fatal_node_error_stops_pipeline_before_downstream_nodes_run() {
    let (nodes, edges) = linear_nodes(&["ok", "boom", "never"]);
    let sorted = topological_sort(&nodes, &edges).expect("valid dag");

    let ok = MockNode::returning("ok", json!({ "ok": true }));
    let boom = MockNode::failing_fatal("boom", "something broke irreparably");
    let never = MockNode::returning("never", json!({ "should": "not run" }));
    let registry: HashMap<&str, &dyn ExecutableNode> = [
        ("ok", &ok as &dyn ExecutableNode),
        ("boom", &boom as &dyn ExecutableNode),
        ("never", &never as &dyn ExecutableNode),
    ]
    .into_iter()
    .collect();

    let step = InMemoryStepRunner::new();
    let mut context = Context::new();
    let mut hit_fatal = false;

    for node in &sorted {
        let mock = registry[node.id.as_str()];
        match mock.execute(&node.data, &node.id, context.clone(), &step, &NoopStatusSink).await {
            Ok(next) => context = next,
            Err(e) => {
                assert_eq!(node.id, "boom");
                assert!(matches!(e, NodeError::Fatal(_)));
                hit_fatal = true;
                break;
            }
        }
    }

    assert!(hit_fatal, "expected a fatal error to stop the pipeline");
    assert_eq!(never.call_count(), 0, "'never' must not run after a fatal upstream error");
}

#[tokio::test]
async fn retryable_node_error_is_returned_as_is() {
    let node = MockNode::failing_retryable("flaky", "transient failure");
    let step = InMemoryStepRunner::new();

    let result = node.execute(&json!({}), "flaky", Context::new(), &step, &NoopStatusSink).await;
    assert!(matches!(result, Err(NodeError::Retryable(_))));
    assert_eq!(node.call_count(), 1);
}

#[tokio::test]
async fn step_checkpoint_runs_the_underlying_node_work_exactly_once() {
    let node = MockNode::returning("cached", json!({ "expensive": true }));
    let step = InMemoryStepRunner::new();
    let context = Context::new();

    let first = node.execute(&json!({}), "cached", context.clone(), &step, &NoopStatusSink).await.unwrap();
    let second = node.execute(&json!({}), "cached", context, &step, &NoopStatusSink).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(step.call_count("cached"), 1, "the checkpointed thunk runs once, not twice");
    assert_eq!(node.call_count(), 2, "the node itself still runs each time — step.run dedupes the side effect, not the node");
}

#[tokio::test]
async fn a_step_runner_that_always_fails_surfaces_a_retryable_error() {
    let node = MockNode::returning("will-fail", json!({ "never": "seen" }));
    let step = AlwaysFailingStepRunner { message: "transport unavailable".into() };

    let result = node.execute(&json!({}), "will-fail", Context::new(), &step, &NoopStatusSink).await;
    assert!(matches!(result, Err(NodeError::Retryable(_))));
}
