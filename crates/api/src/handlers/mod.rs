pub mod executions;
pub mod graph;
pub mod webhooks;
pub mod workflows;
