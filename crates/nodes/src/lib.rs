//! `nodes` crate — the `ExecutableNode` trait and built-in node implementations.
//!
//! Every node — built-in and future plugin alike — must implement
//! [`ExecutableNode`]. The engine crate dispatches execution through this
//! trait object, keyed by node type in its registry.

pub mod context;
pub mod error;
pub mod http_request;
pub mod manual_trigger;
pub mod mock;
pub mod status;
pub mod step;
pub mod traits;

pub use context::Context;
pub use error::NodeError;
pub use http_request::HttpRequestNode;
pub use manual_trigger::ManualTriggerNode;
pub use status::{NodeStatus, NoopStatusSink, StatusSink};
pub use step::{StepFuture, StepRunner, StepThunk};
pub use traits::ExecutableNode;
