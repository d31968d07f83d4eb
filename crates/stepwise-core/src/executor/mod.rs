//! Executor abstraction: the unit of work a step invokes.
//!
//! - `traits` -- the `Executor` trait (RPITIT) and its object-safe mirror
//! - `boxed` -- `BoxExecutor`, the cloneable type-erased handle plans hold
//! - `func` -- `FnExecutor`, an adapter from async closures

pub mod boxed;
pub mod func;
pub mod traits;

pub use boxed::BoxExecutor;
pub use func::{executor_fn, FnExecutor};
pub use traits::{Executor, ExecutorDyn};
