//! Built-in executors referenced by plan files.
//!
//! - `basic` -- echo, template, fail, sleep
//! - `command` -- external process with the input on stdin
//! - `store_set` -- writes its input into the shared store

pub mod basic;
pub mod command;
pub mod store_set;

use serde_json::Value;
use stepwise_core::{BoxExecutor, SharedStore};
use stepwise_types::plan::ExecutorSpec;

pub use basic::{EchoExecutor, FailExecutor, SleepExecutor, TemplateExecutor};
pub use command::CommandExecutor;
pub use store_set::StoreSetExecutor;

/// Render an executor input as text: strings raw, everything else as JSON.
pub fn render_input(input: &Value) -> String {
    match input {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Instantiate the executor a spec describes.
///
/// `store` is the workflow's shared store, captured by executors that write
/// to it.
pub fn build_executor(spec: &ExecutorSpec, store: &SharedStore) -> BoxExecutor {
    match spec {
        ExecutorSpec::Echo => BoxExecutor::new(EchoExecutor),
        ExecutorSpec::Template { template } => {
            BoxExecutor::new(TemplateExecutor::new(template.clone()))
        }
        ExecutorSpec::Command { program, args } => {
            BoxExecutor::new(CommandExecutor::new(program.clone(), args.clone()))
        }
        ExecutorSpec::Fail { message } => BoxExecutor::new(FailExecutor::new(message.clone())),
        ExecutorSpec::Sleep { ms } => BoxExecutor::new(SleepExecutor::from_millis(*ms)),
        ExecutorSpec::StoreSet { key } => {
            BoxExecutor::new(StoreSetExecutor::new(key.clone(), store.clone()))
        }
    }
}
