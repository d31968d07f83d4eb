//! Infrastructure layer for Stepwise.
//!
//! IO-facing pieces that sit around the engine in `stepwise-core`: loading
//! `stepwise.toml`, reading declarative plan files, the built-in executors a
//! plan file can reference, and assembling a runnable `Workflow` from a plan.

pub mod assemble;
pub mod config;
pub mod executors;
pub mod plan_file;
