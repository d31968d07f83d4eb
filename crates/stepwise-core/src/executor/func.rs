//! Closure-backed executors.

use std::future::Future;

use serde_json::Value;
use stepwise_types::error::ExecutorError;

use super::boxed::BoxExecutor;
use super::traits::Executor;

/// An [`Executor`] backed by an async closure.
pub struct FnExecutor<F> {
    name: String,
    func: F,
}

impl<F, Fut> FnExecutor<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ExecutorError>> + Send,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F, Fut> Executor for FnExecutor<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ExecutorError>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(
        &self,
        input: Value,
    ) -> impl Future<Output = Result<Value, ExecutorError>> + Send {
        (self.func)(input)
    }
}

/// Build a [`BoxExecutor`] from a name and an async closure.
///
/// ```
/// use serde_json::Value;
/// use stepwise_core::executor_fn;
///
/// let shout = executor_fn("shout", |input: Value| async move {
///     let text = input.as_str().unwrap_or_default().to_uppercase();
///     Ok::<_, stepwise_core::ExecutorError>(Value::String(text))
/// });
/// assert_eq!(shout.name(), "shout");
/// ```
pub fn executor_fn<F, Fut>(name: impl Into<String>, func: F) -> BoxExecutor
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ExecutorError>> + Send + 'static,
{
    BoxExecutor::new(FnExecutor::new(name, func))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fn_executor_runs_closure() {
        let double = executor_fn("double", |input: Value| async move {
            let n = input.as_i64().ok_or_else(|| ExecutorError::failed("not a number"))?;
            Ok::<_, ExecutorError>(json!(n * 2))
        });
        assert_eq!(double.execute(json!(21)).await.unwrap(), json!(42));
        assert_eq!(
            double.execute(json!("x")).await.unwrap_err().to_string(),
            "not a number"
        );
    }

    #[tokio::test]
    async fn test_fn_executor_captures_state() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let exec = executor_fn("count", move |input: Value| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ExecutorError>(input)
            }
        });

        exec.execute(json!(1)).await.unwrap();
        exec.execute(json!(2)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_fn_executor_name() {
        let exec = FnExecutor::new("named", |input: Value| async move {
            Ok::<_, ExecutorError>(input)
        });
        assert_eq!(Executor::name(&exec), "named");
    }
}
