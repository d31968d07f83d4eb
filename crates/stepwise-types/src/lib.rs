//! Shared domain types for Stepwise.
//!
//! This crate contains the types shared across the Stepwise workspace: step
//! kinds, workflow and global configuration, the declarative plan file format,
//! and the executor error type.
//!
//! Zero runtime dependencies -- only serde, serde_json, thiserror.

pub mod config;
pub mod error;
pub mod plan;
pub mod step;
