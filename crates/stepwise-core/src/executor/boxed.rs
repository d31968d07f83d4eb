//! BoxExecutor -- cloneable dynamic dispatch wrapper for Executor.
//!
//! Follows the blanket-impl pattern:
//! 1. `ExecutorDyn` is the object-safe trait with boxed futures
//! 2. Every `T: Executor` implements `ExecutorDyn`
//! 3. `BoxExecutor` wraps `Arc<dyn ExecutorDyn>` and delegates
//!
//! The `Arc` lets one executor appear in several steps and be moved into the
//! tasks spawned by parallel and iterate steps.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use stepwise_types::error::ExecutorError;

use super::traits::{Executor, ExecutorDyn};

/// Type-erased, cheaply cloneable executor handle.
#[derive(Clone)]
pub struct BoxExecutor {
    inner: Arc<dyn ExecutorDyn>,
}

impl BoxExecutor {
    /// Wrap a concrete `Executor` in a type-erased handle.
    pub fn new<T: Executor + 'static>(executor: T) -> Self {
        Self {
            inner: Arc::new(executor),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn execute(&self, input: Value) -> Result<Value, ExecutorError> {
        self.inner.execute_boxed(input).await
    }

    /// Whether two handles share the same underlying executor.
    pub fn ptr_eq(&self, other: &BoxExecutor) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for BoxExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxExecutor")
            .field("name", &self.name())
            .finish()
    }
}
