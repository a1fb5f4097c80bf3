//! Workflow runner — the generalized, durable replacement for the teacher's
//! `WorkflowExecutor`.
//!
//! Orchestrates: load the graph → topologically sort it → resolve each
//! node's executor from the registry → run nodes in order, threading a
//! monotonically-growing [`Context`] through them → persist per-node and
//! per-execution results. A node failure aborts the whole run; retry is the
//! out-of-scope transport's job on redelivery, not this type's.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;

use db::DbPool;
use nodes::{step, Context, NoopStatusSink};

use crate::dag::topological_sort;
use crate::error::EngineError;
use crate::models::{Node, Workflow};
use crate::registry::Registry;
use crate::step_postgres::PostgresStepRunner;

/// What kicked off this run. Carries the trigger's payload, if any, as the
/// seed of the shared [`Context`].
#[derive(Debug, Clone)]
pub struct TriggerEvent {
    pub initial_data: Option<serde_json::Value>,
}

impl TriggerEvent {
    pub fn manual() -> Self {
        Self { initial_data: None }
    }

    pub fn with_data(data: serde_json::Value) -> Self {
        Self { initial_data: Some(data) }
    }
}

/// A workflow plus its execution order, checkpointed together so a
/// redelivered job doesn't redo graph loading or sorting against a graph
/// that may have since been edited out from under it.
#[derive(Debug, Serialize, Deserialize)]
struct PreparedWorkflow {
    workflow: Workflow,
    order: Vec<Node>,
}

/// The result of a completed (successful) workflow execution.
#[derive(Debug)]
pub struct ExecutionResult {
    pub execution_id: Uuid,
    pub context: Context,
}

/// Stateless orchestrator for a single workflow execution. Construct one
/// per process; it holds only a pool handle and a node registry.
pub struct WorkflowRunner {
    pool: DbPool,
    registry: Registry,
}

impl WorkflowRunner {
    pub fn new(pool: DbPool, registry: Registry) -> Self {
        Self { pool, registry }
    }

    #[instrument(skip(self, event), fields(workflow_id = %workflow_id))]
    pub async fn run(
        &self,
        workflow_id: Uuid,
        user_id: Uuid,
        event: TriggerEvent,
    ) -> Result<ExecutionResult, EngineError> {
        let exec_row = db::repository::executions::create_execution(&self.pool, workflow_id).await?;
        let execution_id = exec_row.id;

        db::repository::executions::update_execution_status(&self.pool, execution_id, "running", false)
            .await?;

        let step = PostgresStepRunner::new(self.pool.clone(), execution_id);

        match self.run_inner(workflow_id, user_id, event, execution_id, &step).await {
            Ok(context) => {
                db::repository::executions::update_execution_status(
                    &self.pool,
                    execution_id,
                    "succeeded",
                    true,
                )
                .await?;
                info!("workflow {} execution {} succeeded", workflow_id, execution_id);
                Ok(ExecutionResult { execution_id, context })
            }
            Err(err) => {
                let _ = db::repository::executions::update_execution_status(
                    &self.pool,
                    execution_id,
                    "failed",
                    true,
                )
                .await;
                error!("workflow {} execution {} failed: {}", workflow_id, execution_id, err);
                Err(err)
            }
        }
    }

    async fn run_inner(
        &self,
        workflow_id: Uuid,
        user_id: Uuid,
        event: TriggerEvent,
        execution_id: Uuid,
        step: &PostgresStepRunner,
    ) -> Result<Context, EngineError> {
        let prepared = self.prepare_workflow(workflow_id, user_id, step).await?;

        info!(
            "prepared workflow '{}' — executing {} nodes in order: {:?}",
            prepared.workflow.id,
            prepared.order.len(),
            prepared.order.iter().map(|n| n.id.as_str()).collect::<Vec<_>>(),
        );

        let mut context = Context::from_initial_data(event.initial_data);

        for node in &prepared.order {
            let executor = self.registry.get(node.node_type)?;
            let started_at = Utc::now();

            match executor
                .execute(&node.data, &node.id, context.clone(), step, &NoopStatusSink)
                .await
            {
                Ok(new_context) => {
                    db::repository::executions::insert_node_execution(
                        &self.pool,
                        execution_id,
                        &node.id,
                        context.clone().into_value(),
                        Some(new_context.clone().into_value()),
                        "succeeded",
                        started_at,
                    )
                    .await?;
                    info!("node '{}' succeeded", node.id);
                    context = new_context;
                }
                Err(node_err) => {
                    let _ = db::repository::executions::insert_node_execution(
                        &self.pool,
                        execution_id,
                        &node.id,
                        context.clone().into_value(),
                        None,
                        "failed",
                        started_at,
                    )
                    .await;
                    return Err(EngineError::from_node_error(&node.id, node_err));
                }
            }
        }

        Ok(context)
    }

    /// Load the graph and topologically sort it, checkpointed as a single
    /// `step.run("prepare-workflow", ...)` call — spec §4.F.2, new behavior
    /// beyond the teacher, which re-validated and re-sorted on every call.
    ///
    /// `step.run`'s thunk can only report failure through [`nodes::NodeError`]'s
    /// two generic buckets, but graph preparation raises the engine's own
    /// richer kinds (`CycleError`, `ConfigError`, `NotFound`, `NotAuthorized`,
    /// ...) which the caller must see unchanged — `CycleError` in particular
    /// is its own surfaced error kind, not a node failure. `failure` is the
    /// side channel the thunk stashes the original `EngineError` into before
    /// collapsing it to a `NodeError` for the `step.run` boundary; once
    /// `step.run` returns we read it back out instead of re-deriving a kind
    /// from the generic `NodeError`.
    async fn prepare_workflow(
        &self,
        workflow_id: Uuid,
        user_id: Uuid,
        step: &PostgresStepRunner,
    ) -> Result<PreparedWorkflow, EngineError> {
        use nodes::StepRunner;

        let pool = self.pool.clone();
        let failure: Arc<Mutex<Option<EngineError>>> = Arc::new(Mutex::new(None));
        let failure_slot = Arc::clone(&failure);

        let result = step
            .run(
                "prepare-workflow",
                step::thunk(move || async move {
                    let outcome: Result<PreparedWorkflow, EngineError> = async {
                        let (workflow_row, node_rows, connection_rows) =
                            db::repository::graph::load_graph(&pool, workflow_id, user_id).await?;

                        let workflow =
                            crate::graph::to_execution_graph(workflow_row, node_rows, connection_rows)?;

                        let order = topological_sort(&workflow.nodes, &workflow.edges)?;

                        Ok(PreparedWorkflow { workflow, order })
                    }
                    .await;

                    match outcome {
                        Ok(prepared) => serde_json::to_value(&prepared).map_err(|e| {
                            nodes::NodeError::Fatal(format!("failed to serialize prepared workflow: {e}"))
                        }),
                        Err(engine_err) => {
                            let retriable = engine_err.is_retriable();
                            *failure_slot.lock().expect("failure slot poisoned") = Some(engine_err);
                            Err(if retriable {
                                nodes::NodeError::Retryable("workflow preparation failed".into())
                            } else {
                                nodes::NodeError::Fatal("workflow preparation failed".into())
                            })
                        }
                    }
                }),
            )
            .await;

        match result {
            Ok(value) => serde_json::from_value(value).map_err(|e| {
                EngineError::ConfigError(format!("corrupt prepare-workflow checkpoint: {e}"))
            }),
            Err(node_err) => Err(failure
                .lock()
                .expect("failure slot poisoned")
                .take()
                .unwrap_or_else(|| EngineError::from_node_error("prepare-workflow", node_err))),
        }
    }
}
