//! Test doubles for [`ExecutableNode`] and [`StepRunner`].
//!
//! Useful in unit and integration tests where a real node implementation or
//! a real durability backend is either unavailable or irrelevant.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::context::Context;
use crate::status::{NodeStatus, StatusSink};
use crate::step::{thunk, StepFuture, StepRunner, StepThunk};
use crate::traits::ExecutableNode;
use crate::NodeError;

/// Behaviour injected into `MockNode` at construction time.
pub enum MockBehaviour {
    /// Return a specific JSON value, recorded under the node's own name.
    ReturnValue(Value),
    /// Fail with a `Retryable` error.
    FailRetryable(String),
    /// Fail with a `Fatal` error.
    FailFatal(String),
}

/// A mock node that records every call it receives and returns a
/// programmer-specified result.
pub struct MockNode {
    /// Label used in test assertions and as the output context key.
    pub name: String,
    /// What the node will do when `execute` is called.
    pub behaviour: MockBehaviour,
    /// All inputs seen by this node (in call order).
    pub calls: Arc<Mutex<Vec<Context>>>,
}

impl MockNode {
    /// Create a mock that always succeeds, writing `value` under its own name.
    pub fn returning(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            behaviour: MockBehaviour::ReturnValue(value),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that always fails with a `Fatal` error.
    pub fn failing_fatal(name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behaviour: MockBehaviour::FailFatal(msg.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that always fails with a `Retryable` error.
    pub fn failing_retryable(name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behaviour: MockBehaviour::FailRetryable(msg.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of times this node has been executed.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ExecutableNode for MockNode {
    async fn execute(
        &self,
        _data: &Value,
        node_id: &str,
        context: Context,
        step: &dyn StepRunner,
        status: &dyn StatusSink,
    ) -> Result<Context, NodeError> {
        self.calls.lock().unwrap().push(context.clone());
        status.emit(node_id, NodeStatus::Loading).await;

        let result = match &self.behaviour {
            MockBehaviour::ReturnValue(v) => {
                let value = v.clone();
                let checkpointed = step
                    .run(&self.name.clone(), thunk(move || async move { Ok(value) }))
                    .await;
                checkpointed.map(|v| context.with(self.name.clone(), v))
            }
            MockBehaviour::FailRetryable(msg) => Err(NodeError::Retryable(msg.clone())),
            MockBehaviour::FailFatal(msg) => Err(NodeError::Fatal(msg.clone())),
        };

        status
            .emit(node_id, if result.is_ok() { NodeStatus::Success } else { NodeStatus::Error })
            .await;
        result
    }
}

/// An in-memory [`StepRunner`] that runs each thunk exactly once per name
/// for the lifetime of the runner instance — no actual durability, matching
/// the spec's guidance that the engine be unit-testable with such a stand-in.
#[derive(Default)]
pub struct InMemoryStepRunner {
    completed: Mutex<HashMap<String, Value>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl InMemoryStepRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self, name: &str) -> usize {
        *self.calls.lock().unwrap().get(name).unwrap_or(&0)
    }
}

#[async_trait]
impl StepRunner for InMemoryStepRunner {
    async fn run(&self, name: &str, thunk: StepThunk<'_>) -> Result<Value, NodeError> {
        if let Some(cached) = self.completed.lock().unwrap().get(name).cloned() {
            return Ok(cached);
        }

        *self.calls.lock().unwrap().entry(name.to_string()).or_insert(0) += 1;

        let fut: StepFuture<'_> = thunk();
        let result = fut.await?;

        self.completed
            .lock()
            .unwrap()
            .insert(name.to_string(), result.clone());

        Ok(result)
    }
}

/// A [`StepRunner`] whose every call fails with the given retryable error,
/// useful for exercising retry-exhaustion paths without real I/O.
pub struct AlwaysFailingStepRunner {
    pub message: String,
}

#[async_trait]
impl StepRunner for AlwaysFailingStepRunner {
    async fn run(&self, _name: &str, _thunk: StepThunk<'_>) -> Result<Value, NodeError> {
        Err(NodeError::Retryable(self.message.clone()))
    }
}

/// A [`StatusSink`] that records every transition it receives, keyed by
/// node id, in emission order — for asserting the `loading`/`success`/
/// `error` sequence spec §9 requires.
#[derive(Default)]
pub struct RecordingStatusSink {
    transitions: Mutex<HashMap<String, Vec<NodeStatus>>>,
}

impl RecordingStatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transitions(&self, node_id: &str) -> Vec<NodeStatus> {
        self.transitions.lock().unwrap().get(node_id).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl StatusSink for RecordingStatusSink {
    async fn emit(&self, node_id: &str, status: NodeStatus) {
        self.transitions
            .lock()
            .unwrap()
            .entry(node_id.to_string())
            .or_default()
            .push(status);
    }
}
