//! Postgres-backed [`StepRunner`] — the durability primitive node executors
//! call through to get "run this exactly once per execution" semantics.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use nodes::{NodeError, StepRunner, StepThunk};

/// Backs `step.run` with the `step_checkpoints` table: a checkpoint already
/// on disk short-circuits the thunk, so a re-delivered job never re-runs
/// work it already completed.
pub struct PostgresStepRunner {
    pool: PgPool,
    execution_id: Uuid,
}

impl PostgresStepRunner {
    pub fn new(pool: PgPool, execution_id: Uuid) -> Self {
        Self { pool, execution_id }
    }
}

#[async_trait]
impl StepRunner for PostgresStepRunner {
    async fn run(&self, name: &str, thunk: StepThunk<'_>) -> Result<Value, NodeError> {
        if let Some(existing) =
            db::repository::steps::get_checkpoint(&self.pool, self.execution_id, name)
                .await
                .map_err(|e| NodeError::Retryable(e.to_string()))?
        {
            return Ok(existing.value);
        }

        let value = thunk().await?;

        let checkpoint = db::repository::steps::put_checkpoint(&self.pool, self.execution_id, name, value)
            .await
            .map_err(|e| NodeError::Retryable(e.to_string()))?;

        Ok(checkpoint.value)
    }
}
