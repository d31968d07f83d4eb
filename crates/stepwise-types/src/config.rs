//! Configuration types for Stepwise.
//!
//! `GlobalConfig` represents the optional `stepwise.toml` that controls loop
//! pacing and logging. `WorkflowConfig` is the per-workflow construction
//! config passed to `Workflow::new`.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the `stepwise` binary.
///
/// Loaded from `stepwise.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Delay between loop iterations in milliseconds.
    #[serde(default = "default_loop_delay_ms")]
    pub loop_delay_ms: u64,

    /// Bridge tracing spans to OpenTelemetry (stdout exporter).
    #[serde(default)]
    pub otel: bool,

    /// `EnvFilter` directive used when no `-v` flag is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

fn default_loop_delay_ms() -> u64 {
    1_000
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            loop_delay_ms: default_loop_delay_ms(),
            otel: false,
            log_filter: None,
        }
    }
}

/// Construction config for a single workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Human-readable workflow name, used in logs.
    #[serde(default = "default_workflow_name")]
    pub name: String,

    /// Initial prompt. Becomes the first step's input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

fn default_workflow_name() -> String {
    "workflow".to_string()
}

impl WorkflowConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: None,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self::new(default_workflow_name())
    }
}
