//! Typed error type for the queue crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("no job available")]
    Empty,

    #[error("database error: {0}")]
    Database(#[from] db::DbError),
}
