//! Stateless built-in executors.

use std::time::Duration;

use serde_json::Value;
use stepwise_core::Executor;
use stepwise_types::error::ExecutorError;

use super::render_input;

/// Placeholder replaced by the rendered input in a template.
const INPUT_PLACEHOLDER: &str = "{{input}}";

/// Returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoExecutor;

impl Executor for EchoExecutor {
    fn name(&self) -> &str {
        "echo"
    }

    async fn execute(&self, input: Value) -> Result<Value, ExecutorError> {
        Ok(input)
    }
}

/// Substitutes every `{{input}}` in a template with the rendered input.
#[derive(Debug, Clone)]
pub struct TemplateExecutor {
    template: String,
}

impl TemplateExecutor {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl Executor for TemplateExecutor {
    fn name(&self) -> &str {
        "template"
    }

    async fn execute(&self, input: Value) -> Result<Value, ExecutorError> {
        let rendered = self
            .template
            .replace(INPUT_PLACEHOLDER, &render_input(&input));
        Ok(Value::String(rendered))
    }
}

/// Always fails with a fixed message.
#[derive(Debug, Clone)]
pub struct FailExecutor {
    message: String,
}

impl FailExecutor {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Executor for FailExecutor {
    fn name(&self) -> &str {
        "fail"
    }

    async fn execute(&self, _input: Value) -> Result<Value, ExecutorError> {
        Err(ExecutorError::failed(self.message.clone()))
    }
}

/// Waits, then returns its input.
#[derive(Debug, Clone, Copy)]
pub struct SleepExecutor {
    duration: Duration,
}

impl SleepExecutor {
    pub fn from_millis(ms: u64) -> Self {
        Self {
            duration: Duration::from_millis(ms),
        }
    }
}

impl Executor for SleepExecutor {
    fn name(&self) -> &str {
        "sleep"
    }

    async fn execute(&self, input: Value) -> Result<Value, ExecutorError> {
        tokio::time::sleep(self.duration).await;
        Ok(input)
    }
}
