//! Executor that writes its input into the shared store.

use serde_json::Value;
use stepwise_core::{Executor, SharedStore};
use stepwise_types::error::ExecutorError;

/// Stores its input under `key` and returns it unchanged.
///
/// Concurrent writes to the same key (from a parallel or iterate step)
/// resolve last-write-wins.
#[derive(Debug, Clone)]
pub struct StoreSetExecutor {
    name: String,
    key: String,
    store: SharedStore,
}

impl StoreSetExecutor {
    pub fn new(key: impl Into<String>, store: SharedStore) -> Self {
        let key = key.into();
        Self {
            name: format!("store_set:{key}"),
            key,
            store,
        }
    }
}

impl Executor for StoreSetExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, input: Value) -> Result<Value, ExecutorError> {
        tracing::trace!(key = %self.key, "writing shared store entry");
        self.store.set(self.key.clone(), input.clone());
        Ok(input)
    }
}
