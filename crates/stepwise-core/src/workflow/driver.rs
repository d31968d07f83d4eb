//! Loop driver: re-runs a workflow on a fixed delay until stopped.
//!
//! Iterations never overlap. A failed run is logged and the loop carries on;
//! only cancellation ends it. The delay timer is armed after each iteration
//! completes, so the first iteration starts immediately.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::builder::Workflow;
use super::error::WorkflowError;

/// What a stopped loop hands back.
#[derive(Debug)]
pub struct LoopStopped {
    pub workflow: Workflow,
    /// Completed iterations, counted once the loop task has exited.
    pub iterations: u64,
}

/// Handle to a running loop.
///
/// Dropping the handle does not stop the loop; call [`LoopHandle::stop`] or
/// cancel the token from [`LoopHandle::cancellation_token`].
#[derive(Debug)]
pub struct LoopHandle {
    cancel: CancellationToken,
    iterations: Arc<AtomicU64>,
    task: JoinHandle<Workflow>,
}

impl LoopHandle {
    /// Completed iterations, successful or not.
    pub fn iterations(&self) -> u64 {
        self.iterations.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Token that stops the loop when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel the loop and wait for it to wind down.
    ///
    /// A run in flight is interrupted at its next await point. Returns the
    /// workflow so it can be inspected or run again, with the final
    /// iteration count.
    pub async fn stop(self) -> Result<LoopStopped, WorkflowError> {
        self.cancel.cancel();
        let workflow = self
            .task
            .await
            .map_err(|e| WorkflowError::LoopTask(e.to_string()))?;
        Ok(LoopStopped {
            workflow,
            iterations: self.iterations.load(Ordering::SeqCst),
        })
    }
}

impl Workflow {
    /// Run this workflow repeatedly in a background task, sleeping `delay`
    /// between iterations.
    pub fn spawn_loop(mut self, delay: Duration) -> LoopHandle {
        let cancel = CancellationToken::new();
        let iterations = Arc::new(AtomicU64::new(0));

        let token = cancel.clone();
        let counter = Arc::clone(&iterations);
        let task = tokio::spawn(async move {
            tracing::info!(workflow = self.name(), ?delay, "loop started");

            loop {
                match self.run_with_cancel(&token).await {
                    Ok(outcome) => {
                        tracing::debug!(
                            workflow = self.name(),
                            run_id = %outcome.run_id,
                            steps = outcome.steps_executed,
                            "loop iteration finished"
                        );
                    }
                    Err(WorkflowError::Cancelled) => break,
                    Err(e) => {
                        tracing::error!(workflow = self.name(), error = %e, "loop iteration failed");
                    }
                }
                counter.fetch_add(1, Ordering::SeqCst);

                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            tracing::info!(
                workflow = self.name(),
                iterations = counter.load(Ordering::SeqCst),
                "loop stopped"
            );
            self
        });

        LoopHandle {
            cancel,
            iterations,
            task,
        }
    }
}
