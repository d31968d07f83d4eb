//! Executor trait definition.
//!
//! This is the core abstraction every unit of work implements. `Executor`
//! uses RPITIT for `execute`; `ExecutorDyn` is the object-safe version with
//! boxed futures, blanket-implemented for every `Executor`.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use stepwise_types::error::ExecutorError;

/// Trait for anything a workflow step can invoke (LLM agents, commands,
/// handlers, closures).
///
/// The engine never inspects the output beyond passing it on, so an
/// executor may return any JSON value.
pub trait Executor: Send + Sync {
    /// Human-readable name, used only for diagnostics.
    fn name(&self) -> &str;

    /// Produce an output for `input`, or fail.
    fn execute(
        &self,
        input: Value,
    ) -> impl Future<Output = Result<Value, ExecutorError>> + Send;
}

/// Object-safe version of [`Executor`] with boxed futures.
///
/// This trait exists solely to enable dynamic dispatch (`dyn ExecutorDyn`).
pub trait ExecutorDyn: Send + Sync {
    fn name(&self) -> &str;

    fn execute_boxed(
        &self,
        input: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ExecutorError>> + Send + '_>>;
}

impl<T: Executor> ExecutorDyn for T {
    fn name(&self) -> &str {
        Executor::name(self)
    }

    fn execute_boxed(
        &self,
        input: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ExecutorError>> + Send + '_>> {
        Box::pin(self.execute(input))
    }
}
