use stepwise_types::error::ExecutorError;

/// Errors that can abort a workflow run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    /// An executor failed and the step had no `on_fail` handler.
    ///
    /// Transparent, so the run error reads exactly like the executor's.
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    /// An iterate step's store key did not hold an array.
    #[error("shared store key '{key}' does not hold an array (found {found})")]
    InvalidIterationSource { key: String, found: &'static str },

    /// The run was cancelled through its cancellation token.
    #[error("workflow run cancelled")]
    Cancelled,

    /// The background loop task panicked or was aborted.
    #[error("loop task failed: {0}")]
    LoopTask(String),
}

impl WorkflowError {
    /// Whether an `on_fail` handler may absorb this error.
    pub fn is_absorbable(&self) -> bool {
        !matches!(self, WorkflowError::Cancelled)
    }
}
