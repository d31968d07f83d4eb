//! Workflow engine core: plan construction, step interpretation, and looping.
//!
//! - `store` -- Shared key/value store visible to every step
//! - `plan` -- Execution plan and step payload sum type
//! - `error` -- Run-level error type
//! - `runner` -- Plan interpreter with the success/failure handler protocol
//! - `builder` -- `Workflow`, the chainable builder that owns plan and state
//! - `driver` -- Loop driver that re-runs a workflow on a fixed delay

pub mod builder;
pub mod driver;
pub mod error;
pub mod plan;
pub mod runner;
pub mod store;

pub use builder::Workflow;
pub use driver::{LoopHandle, LoopStopped};
pub use error::WorkflowError;
pub use plan::{ExecutionPlan, ExecutionStep, IterateSource, StepPayload};
pub use runner::{PlanRunner, RunOutcome, RunState};
pub use store::SharedStore;
