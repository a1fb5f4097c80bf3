//! Shared error→status mapping so every handler reports failures consistently.

use axum::http::StatusCode;

pub fn db_error_status(err: &db::DbError) -> StatusCode {
    match err {
        db::DbError::NotFound => StatusCode::NOT_FOUND,
        db::DbError::NotAuthorized => StatusCode::FORBIDDEN,
        db::DbError::Sqlx(_) | db::DbError::Migration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn engine_error_status(err: &engine::EngineError) -> StatusCode {
    use engine::EngineError::*;
    match err {
        NotFound => StatusCode::NOT_FOUND,
        NotAuthorized => StatusCode::FORBIDDEN,
        ConfigError(_) | DuplicateNodeId(_) | UnknownNodeReference { .. } | CycleError => {
            StatusCode::BAD_REQUEST
        }
        NodeFatal { .. } | TransientError { .. } | Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn queue_error_status(err: &queue::QueueError) -> StatusCode {
    match err {
        queue::QueueError::Empty => StatusCode::NOT_FOUND,
        queue::QueueError::Database(e) => db_error_status(e),
    }
}
