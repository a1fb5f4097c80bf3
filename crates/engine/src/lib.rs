//! `engine` crate — core domain models, DAG validation, the executor
//! registry, and the durable workflow runner.

pub mod config;
pub mod dag;
pub mod error;
pub mod graph;
pub mod models;
pub mod registry;
pub mod runner;
pub mod step_postgres;

pub use error::EngineError;
pub use models::{Edge, Node, NodeType, Trigger, Workflow};
pub use registry::Registry;
pub use runner::{ExecutionResult, TriggerEvent, WorkflowRunner};

#[cfg(test)]
mod runner_tests;
