//! The `step.run` durability primitive.
//!
//! `StepRunner` is the abstract dependency an [`crate::ExecutableNode`]
//! receives at execution time. The runner (in the `engine` crate) supplies
//! a concrete implementation backed by whatever checkpoint store the
//! transport provides; the `nodes` crate only needs the trait so executors
//! can be written and tested without depending on `engine` or `db`.
//!
//! A thunk runs at most once per `(execution, name)` pair across process
//! restarts: if the thunk has already completed for this name, the cached
//! value is returned and the thunk is not invoked again.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::NodeError;

/// A boxed, type-erased future yielding the thunk's result.
pub type StepFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, NodeError>> + Send + 'a>>;

/// A boxed, type-erased thunk passed to [`StepRunner::run`].
///
/// Boxing the closure (rather than making `run` generic) keeps the trait
/// object-safe, since executors hold `&dyn StepRunner`.
pub type StepThunk<'a> = Box<dyn FnOnce() -> StepFuture<'a> + Send + 'a>;

/// Wrap an `async fn() -> Result<Value, NodeError>`-shaped closure into a
/// [`StepThunk`] suitable for [`StepRunner::run`].
pub fn thunk<'a, F, Fut>(f: F) -> StepThunk<'a>
where
    F: FnOnce() -> Fut + Send + 'a,
    Fut: Future<Output = Result<Value, NodeError>> + Send + 'a,
{
    Box::new(move || Box::pin(f()))
}

/// Abstract durability checkpoint. See module docs.
#[async_trait::async_trait]
pub trait StepRunner: Send + Sync {
    /// Run `thunk` at most once for `name` within the current execution.
    ///
    /// `name` must be unique within the executor invoking it; callers are
    /// expected to pick one `step.run` per principal side effect.
    async fn run(&self, name: &str, thunk: StepThunk<'_>) -> Result<Value, NodeError>;
}
