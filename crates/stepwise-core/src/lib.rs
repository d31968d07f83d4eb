//! Workflow execution engine for Stepwise.
//!
//! This crate defines the executor "port" ([`executor::Executor`]) that agents,
//! commands and other units of work implement, and the engine that drives them:
//! an ordered execution plan, the plan runner with its success/failure handler
//! protocol, the shared store, and the loop driver. It depends only on
//! `stepwise-types` -- never on `stepwise-infra` or any IO crate.

pub mod executor;
pub mod workflow;

pub use executor::{executor_fn, BoxExecutor, Executor, FnExecutor};
pub use stepwise_types::error::ExecutorError;
pub use workflow::{
    ExecutionPlan, ExecutionStep, IterateSource, LoopHandle, LoopStopped, RunOutcome, SharedStore,
    StepPayload, Workflow, WorkflowError,
};
