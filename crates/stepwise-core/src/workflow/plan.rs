//! Execution plan: the ordered list of steps a workflow runs.
//!
//! Step kinds are a sum type, so every kind the runner can meet is known at
//! compile time. Handlers are executors, not steps: they receive the step's
//! output (or error message) and their result replaces it.

use std::fmt;

use serde_json::Value;
use stepwise_types::step::StepKind;

use crate::executor::BoxExecutor;

// ---------------------------------------------------------------------------
// IterateSource
// ---------------------------------------------------------------------------

/// Where an iterate step gets its items from.
#[derive(Debug, Clone, PartialEq)]
pub enum IterateSource {
    /// Literal items.
    Items(Vec<Value>),
    /// Key of an array in the shared store, resolved when the step runs.
    StoreKey(String),
}

impl From<Vec<Value>> for IterateSource {
    fn from(items: Vec<Value>) -> Self {
        IterateSource::Items(items)
    }
}

impl From<&str> for IterateSource {
    fn from(key: &str) -> Self {
        IterateSource::StoreKey(key.to_string())
    }
}

impl From<String> for IterateSource {
    fn from(key: String) -> Self {
        IterateSource::StoreKey(key)
    }
}

impl fmt::Display for IterateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IterateSource::Items(items) => write!(f, "{} items", items.len()),
            IterateSource::StoreKey(key) => write!(f, "store key '{key}'"),
        }
    }
}

// ---------------------------------------------------------------------------
// StepPayload
// ---------------------------------------------------------------------------

/// Kind-specific step payload.
#[derive(Debug, Clone)]
pub enum StepPayload {
    /// Replace the current prompt and emit it.
    Prompt(String),
    /// Chain executors, each fed the previous output.
    Sequence(Vec<BoxExecutor>),
    /// Feed the same input to every executor concurrently.
    Parallel(Vec<BoxExecutor>),
    /// Feed each item to `agent` concurrently.
    Iterate {
        items: IterateSource,
        agent: BoxExecutor,
    },
}

impl StepPayload {
    pub fn kind(&self) -> StepKind {
        match self {
            StepPayload::Prompt(_) => StepKind::Prompt,
            StepPayload::Sequence(_) => StepKind::Sequence,
            StepPayload::Parallel(_) => StepKind::Parallel,
            StepPayload::Iterate { .. } => StepKind::Iterate,
        }
    }

    /// Default description derived from the payload.
    pub fn describe(&self) -> String {
        match self {
            StepPayload::Prompt(text) => format!("prompt ({} chars)", text.chars().count()),
            StepPayload::Sequence(executors) => {
                format!("sequence: {}", join_names(executors, " -> "))
            }
            StepPayload::Parallel(executors) => {
                format!("parallel: {}", join_names(executors, ", "))
            }
            StepPayload::Iterate { items, agent } => {
                format!("iterate over {items} with {}", agent.name())
            }
        }
    }
}

fn join_names(executors: &[BoxExecutor], sep: &str) -> String {
    if executors.is_empty() {
        return "(none)".to_string();
    }
    executors
        .iter()
        .map(BoxExecutor::name)
        .collect::<Vec<_>>()
        .join(sep)
}

// ---------------------------------------------------------------------------
// ExecutionStep
// ---------------------------------------------------------------------------

/// One entry in the plan.
#[derive(Debug, Clone)]
pub struct ExecutionStep {
    pub payload: StepPayload,
    /// Diagnostic only.
    pub description: String,
    pub on_success: Option<BoxExecutor>,
    pub on_fail: Option<BoxExecutor>,
}

impl ExecutionStep {
    pub fn new(payload: StepPayload, description: impl Into<String>) -> Self {
        Self {
            payload,
            description: description.into(),
            on_success: None,
            on_fail: None,
        }
    }

    pub fn kind(&self) -> StepKind {
        self.payload.kind()
    }
}

// ---------------------------------------------------------------------------
// ExecutionPlan
// ---------------------------------------------------------------------------

/// Append-only, ordered list of steps.
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    steps: Vec<ExecutionStep>,
}

impl ExecutionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: ExecutionStep) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[ExecutionStep] {
        &self.steps
    }

    pub fn last_mut(&mut self) -> Option<&mut ExecutionStep> {
        self.steps.last_mut()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "(empty plan)");
        }
        for (idx, step) in self.steps.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{}. [{}] {}", idx + 1, step.kind(), step.description)?;
            if let Some(handler) = &step.on_success {
                write!(f, " (on_success: {})", handler.name())?;
            }
            if let Some(handler) = &step.on_fail {
                write!(f, " (on_fail: {})", handler.name())?;
            }
        }
        Ok(())
    }
}
