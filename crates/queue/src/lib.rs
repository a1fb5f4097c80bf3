//! `queue` crate — the in-process stand-in for the out-of-scope production
//! at-least-once job transport.
//!
//! Exposes [`JobTransport`] plus two implementations: [`PostgresJobTransport`]
//! (backed by `db::repository::jobs`'s `job_queue` table) for the CLI
//! `worker` subcommand, and [`InMemoryJobTransport`] for tests.

pub mod error;
pub mod transport;

pub use error::QueueError;
pub use transport::{InMemoryJobTransport, Job, JobTransport, PostgresJobTransport};
