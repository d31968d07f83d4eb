//! Plan runner: interprets an `ExecutionPlan` step by step.
//!
//! A single "current value" threads through the plan. It starts as the run
//! state's prompt (or `null`), each step consumes it as input, and the step's
//! output (possibly replaced by a handler) becomes the next step's input.
//!
//! # Handler protocol
//!
//! 1. Dispatch the step by payload kind.
//! 2. On success, an `on_success` handler receives the output and its result
//!    replaces the output. A failing `on_success` counts as a step failure.
//! 3. On failure, the error is logged. An `on_fail` handler receives the
//!    error message and its result becomes the step output; without one the
//!    run aborts with the original error.
//!
//! # Concurrency
//!
//! Parallel and iterate steps spawn one tokio task per invocation at step
//! entry. The step fails on the first error observed; sibling tasks are not
//! aborted, they finish in the background and their results are discarded.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use futures_util::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use serde_json::Value;
use stepwise_types::error::ExecutorError;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::executor::BoxExecutor;

use super::error::WorkflowError;
use super::plan::{ExecutionPlan, ExecutionStep, IterateSource, StepPayload};
use super::store::SharedStore;

// ---------------------------------------------------------------------------
// RunState
// ---------------------------------------------------------------------------

/// Mutable state a run reads and writes: the current prompt.
///
/// Passed to the runner by reference so that prompt changes made by earlier
/// steps survive a later step aborting the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    pub prompt: Option<String>,
}

impl RunState {
    pub fn new(prompt: Option<String>) -> Self {
        Self { prompt }
    }

    /// Input for the first step.
    fn initial_input(&self) -> Value {
        self.prompt.clone().map(Value::String).unwrap_or(Value::Null)
    }
}

// ---------------------------------------------------------------------------
// RunOutcome
// ---------------------------------------------------------------------------

/// Result of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub run_id: Uuid,
    /// Output of the last step, `None` for an empty plan.
    pub final_output: Option<Value>,
    /// Snapshot of the shared store taken when the run finished.
    pub shared_store: BTreeMap<String, Value>,
    pub steps_executed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// PlanRunner
// ---------------------------------------------------------------------------

/// Executes a plan against a shared store.
pub struct PlanRunner<'a> {
    workflow_name: &'a str,
    plan: &'a ExecutionPlan,
    store: &'a SharedStore,
}

impl<'a> PlanRunner<'a> {
    pub fn new(workflow_name: &'a str, plan: &'a ExecutionPlan, store: &'a SharedStore) -> Self {
        Self {
            workflow_name,
            plan,
            store,
        }
    }

    /// Run every step in order.
    ///
    /// `cancel` is checked before each step and raced against the step in
    /// flight; a cancelled run returns [`WorkflowError::Cancelled`].
    pub async fn run(
        &self,
        state: &mut RunState,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome, WorkflowError> {
        let run_id = Uuid::now_v7();
        let span = tracing::info_span!(
            "workflow_run",
            workflow = self.workflow_name,
            run_id = %run_id,
        );
        self.run_steps(run_id, state, cancel).instrument(span).await
    }

    async fn run_steps(
        &self,
        run_id: Uuid,
        state: &mut RunState,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome, WorkflowError> {
        let started_at = Utc::now();

        if self.plan.is_empty() {
            tracing::warn!("execution plan is empty, nothing to run");
            return Ok(RunOutcome {
                run_id,
                final_output: None,
                shared_store: self.store.snapshot(),
                steps_executed: 0,
                started_at,
                finished_at: Utc::now(),
            });
        }

        let mut current = state.initial_input();

        for (idx, step) in self.plan.steps().iter().enumerate() {
            let index = idx + 1;
            if cancel.is_cancelled() {
                tracing::warn!(step = index, "run cancelled before step");
                return Err(WorkflowError::Cancelled);
            }

            tracing::debug!(
                step = index,
                kind = %step.kind(),
                description = step.description.as_str(),
                input = %current,
                "entering step"
            );

            current = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::warn!(step = index, "run cancelled during step");
                    return Err(WorkflowError::Cancelled);
                }
                result = self.run_step(index, step, current, state) => result?,
            };
        }

        tracing::debug!(steps = self.plan.len(), "run complete");

        Ok(RunOutcome {
            run_id,
            final_output: Some(current),
            shared_store: self.store.snapshot(),
            steps_executed: self.plan.len(),
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Dispatch one step and apply the handler protocol.
    async fn run_step(
        &self,
        index: usize,
        step: &ExecutionStep,
        input: Value,
        state: &mut RunState,
    ) -> Result<Value, WorkflowError> {
        let attempt = match (self.dispatch(step, input, state).await, &step.on_success) {
            (Ok(output), Some(handler)) => {
                tracing::debug!(step = index, handler = handler.name(), "running success handler");
                handler.execute(output).await.map_err(WorkflowError::from)
            }
            (result, _) => result,
        };

        let err = match attempt {
            Ok(output) => return Ok(output),
            Err(err) => err,
        };

        tracing::error!(
            step = index,
            kind = %step.kind(),
            error = %err,
            details = ?err,
            "step failed"
        );

        match &step.on_fail {
            Some(handler) if err.is_absorbable() => {
                tracing::info!(step = index, handler = handler.name(), "failure handled by on_fail");
                let output = handler.execute(Value::String(err.to_string())).await?;
                Ok(output)
            }
            _ => Err(err),
        }
    }

    async fn dispatch(
        &self,
        step: &ExecutionStep,
        input: Value,
        state: &mut RunState,
    ) -> Result<Value, WorkflowError> {
        match &step.payload {
            StepPayload::Prompt(text) => {
                state.prompt = Some(text.clone());
                Ok(Value::String(text.clone()))
            }
            StepPayload::Sequence(executors) => {
                let mut output = input;
                for executor in executors {
                    tracing::trace!(executor = executor.name(), "sequence link");
                    output = executor.execute(output).await?;
                }
                Ok(output)
            }
            StepPayload::Parallel(executors) => {
                let calls = executors
                    .iter()
                    .map(|executor| (executor.clone(), input.clone()))
                    .collect();
                Ok(Value::Array(run_all(calls).await?))
            }
            StepPayload::Iterate { items, agent } => {
                let items = self.resolve_items(items)?;
                tracing::debug!(count = items.len(), agent = agent.name(), "fanning out");
                let calls = items
                    .into_iter()
                    .map(|item| (agent.clone(), item))
                    .collect();
                Ok(Value::Array(run_all(calls).await?))
            }
        }
    }

    fn resolve_items(&self, source: &IterateSource) -> Result<Vec<Value>, WorkflowError> {
        match source {
            IterateSource::Items(items) => Ok(items.clone()),
            IterateSource::StoreKey(key) => match self.store.get(key) {
                Some(Value::Array(items)) => Ok(items),
                other => Err(WorkflowError::InvalidIterationSource {
                    key: key.clone(),
                    found: value_kind(other.as_ref()),
                }),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Spawn every call at once and collect results in call order.
///
/// Returns on the first failure observed. Remaining tasks are detached, not
/// aborted.
async fn run_all(calls: Vec<(BoxExecutor, Value)>) -> Result<Vec<Value>, WorkflowError> {
    let mut results: Vec<Option<Value>> = vec![None; calls.len()];

    let mut pending: FuturesUnordered<_> = calls
        .into_iter()
        .enumerate()
        .map(|(idx, (executor, input))| {
            let handle = tokio::spawn(async move { executor.execute(input).await });
            async move { (idx, handle.await) }
        })
        .collect();

    while let Some((idx, joined)) = pending.next().await {
        let output = joined.map_err(|e| ExecutorError::TaskAborted(e.to_string()))??;
        results[idx] = Some(output);
    }

    Ok(results.into_iter().flatten().collect())
}

fn value_kind(value: Option<&Value>) -> &'static str {
    match value {
        None => "no value",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
