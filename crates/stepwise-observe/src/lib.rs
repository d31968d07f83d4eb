//! Observability for Stepwise: tracing subscriber setup.

pub mod tracing_setup;
