use thiserror::Error;

/// Errors returned by an executor invocation.
///
/// The display form of `Failed` is the bare message so that a run aborted by
/// an executor surfaces exactly what the executor reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    #[error("{0}")]
    Failed(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("executor task aborted: {0}")]
    TaskAborted(String),
}

impl ExecutorError {
    /// Shorthand for [`ExecutorError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        ExecutorError::Failed(message.into())
    }
}

impl From<std::io::Error> for ExecutorError {
    fn from(err: std::io::Error) -> Self {
        ExecutorError::Io(err.to_string())
    }
}
