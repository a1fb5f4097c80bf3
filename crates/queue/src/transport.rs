//! `JobTransport` — the abstraction standing in for the out-of-scope
//! production at-least-once message transport.
//!
//! Grounded in the teacher's `job_queue` table and its
//! `fetch_next_job`/`SELECT ... FOR UPDATE SKIP LOCKED` polling pattern:
//! [`PostgresJobTransport`] is a thin wrapper over `db::repository::jobs`,
//! and [`InMemoryJobTransport`] reproduces the same at-least-once contract
//! in-process for tests and local experimentation that don't want a live
//! Postgres connection.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use db::models::JobRow;
use db::DbPool;

use crate::error::QueueError;

/// A job handed to a worker for processing.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Job {
    pub id: Uuid,
    pub execution_id: Uuid,
    pub workflow_id: Uuid,
    pub owner_id: Uuid,
    pub attempts: i32,
    pub max_attempts: i32,
    pub payload: serde_json::Value,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        Self {
            id: row.id,
            execution_id: row.execution_id,
            workflow_id: row.workflow_id,
            owner_id: row.owner_id,
            attempts: row.attempts,
            max_attempts: row.max_attempts,
            payload: row.payload,
        }
    }
}

/// The transport contract a worker loop depends on. At-least-once: a job
/// that is neither acked nor nacked stays claimed — reclaiming stuck jobs
/// is left to the out-of-scope production transport.
#[async_trait]
pub trait JobTransport: Send + Sync {
    /// Enqueue a job for an execution.
    async fn enqueue(
        &self,
        execution_id: Uuid,
        workflow_id: Uuid,
        owner_id: Uuid,
        payload: serde_json::Value,
    ) -> Result<Job, QueueError>;

    /// Claim the next available job, if any.
    async fn poll(&self) -> Result<Option<Job>, QueueError>;

    /// Acknowledge successful processing.
    async fn ack(&self, job_id: Uuid) -> Result<(), QueueError>;

    /// Report a failed attempt. The transport decides whether to retry
    /// (attempts still under `max_attempts`) or dead-letter the job.
    async fn nack(&self, job_id: Uuid, max_attempts: i32) -> Result<(), QueueError>;
}

/// Postgres-backed transport — the production stand-in, delegating
/// directly to `db::repository::jobs`.
pub struct PostgresJobTransport {
    pool: DbPool,
}

impl PostgresJobTransport {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobTransport for PostgresJobTransport {
    async fn enqueue(
        &self,
        execution_id: Uuid,
        workflow_id: Uuid,
        owner_id: Uuid,
        payload: serde_json::Value,
    ) -> Result<Job, QueueError> {
        let row =
            db::repository::jobs::enqueue_job(&self.pool, execution_id, workflow_id, owner_id, payload).await?;
        Ok(row.into())
    }

    async fn poll(&self) -> Result<Option<Job>, QueueError> {
        let row = db::repository::jobs::fetch_next_job(&self.pool).await?;
        Ok(row.map(Job::from))
    }

    async fn ack(&self, job_id: Uuid) -> Result<(), QueueError> {
        db::repository::jobs::complete_job(&self.pool, job_id).await?;
        Ok(())
    }

    async fn nack(&self, job_id: Uuid, max_attempts: i32) -> Result<(), QueueError> {
        db::repository::jobs::fail_job(&self.pool, job_id, max_attempts).await?;
        Ok(())
    }
}

/// In-memory transport — no persistence, no `SKIP LOCKED`, but the same
/// at-least-once contract, so runner/worker tests can exercise retry and
/// dead-lettering without a database.
#[derive(Default)]
pub struct InMemoryJobTransport {
    state: Mutex<InMemoryState>,
}

#[derive(Default)]
struct InMemoryState {
    pending: VecDeque<Job>,
    processing: Vec<Job>,
    dead_lettered: Vec<Job>,
}

impl InMemoryJobTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs that have exhausted their retries.
    pub fn dead_letter_count(&self) -> usize {
        self.state.lock().unwrap().dead_lettered.len()
    }
}

#[async_trait]
impl JobTransport for InMemoryJobTransport {
    async fn enqueue(
        &self,
        execution_id: Uuid,
        workflow_id: Uuid,
        owner_id: Uuid,
        payload: serde_json::Value,
    ) -> Result<Job, QueueError> {
        let job = Job {
            id: Uuid::new_v4(),
            execution_id,
            workflow_id,
            owner_id,
            attempts: 0,
            max_attempts: 3,
            payload,
        };
        self.state.lock().unwrap().pending.push_back(job.clone());
        Ok(job)
    }

    async fn poll(&self) -> Result<Option<Job>, QueueError> {
        let mut state = self.state.lock().unwrap();
        let Some(mut job) = state.pending.pop_front() else {
            return Ok(None);
        };
        job.attempts += 1;
        state.processing.push(job.clone());
        Ok(Some(job))
    }

    async fn ack(&self, job_id: Uuid) -> Result<(), QueueError> {
        let mut state = self.state.lock().unwrap();
        state.processing.retain(|j| j.id != job_id);
        Ok(())
    }

    async fn nack(&self, job_id: Uuid, max_attempts: i32) -> Result<(), QueueError> {
        let mut state = self.state.lock().unwrap();
        if let Some(pos) = state.processing.iter().position(|j| j.id == job_id) {
            let job = state.processing.remove(pos);
            if job.attempts < max_attempts {
                state.pending.push_back(job);
            } else {
                state.dead_lettered.push(job);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn enqueued_job_is_claimed_exactly_once_at_a_time() {
        let transport = InMemoryJobTransport::new();
        let job = transport
            .enqueue(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), json!({}))
            .await
            .unwrap();

        let claimed = transport.poll().await.unwrap().expect("job should be claimable");
        assert_eq!(claimed.id, job.id);
        assert_eq!(claimed.attempts, 1);

        assert!(transport.poll().await.unwrap().is_none(), "job is claimed, not re-offered");
    }

    #[tokio::test]
    async fn nack_under_max_attempts_returns_job_to_pending() {
        let transport = InMemoryJobTransport::new();
        transport
            .enqueue(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), json!({}))
            .await
            .unwrap();

        let job = transport.poll().await.unwrap().unwrap();
        transport.nack(job.id, 3).await.unwrap();

        let retried = transport.poll().await.unwrap().expect("job should be retried");
        assert_eq!(retried.attempts, 2);
        assert_eq!(transport.dead_letter_count(), 0);
    }

    #[tokio::test]
    async fn nack_at_max_attempts_dead_letters_the_job() {
        let transport = InMemoryJobTransport::new();
        transport
            .enqueue(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), json!({}))
            .await
            .unwrap();

        let job = transport.poll().await.unwrap().unwrap();
        transport.nack(job.id, 1).await.unwrap();

        assert!(transport.poll().await.unwrap().is_none());
        assert_eq!(transport.dead_letter_count(), 1);
    }

    #[tokio::test]
    async fn ack_removes_the_job_permanently() {
        let transport = InMemoryJobTransport::new();
        transport
            .enqueue(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), json!({}))
            .await
            .unwrap();

        let job = transport.poll().await.unwrap().unwrap();
        transport.ack(job.id).await.unwrap();

        assert!(transport.poll().await.unwrap().is_none());
        assert_eq!(transport.dead_letter_count(), 0);
    }
}
