//! Executor backed by an external process.
//!
//! The rendered input is written to the child's stdin, concurrently with
//! reading its output, and stdin is closed once written.
//! Trimmed stdout becomes the output. A non-zero exit fails with the trimmed
//! stderr in the message.

use std::process::Stdio;

use serde_json::Value;
use stepwise_core::Executor;
use stepwise_types::error::ExecutorError;
use tokio::io::AsyncWriteExt;

use super::render_input;

/// Runs `program` with `args` once per invocation.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    name: String,
    program: String,
    args: Vec<String>,
}

impl CommandExecutor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        let program = program.into();
        Self {
            name: format!("command:{program}"),
            program,
            args,
        }
    }
}

impl Executor for CommandExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, input: Value) -> Result<Value, ExecutorError> {
        tracing::debug!(program = %self.program, args = ?self.args, "spawning command");

        let mut child = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ExecutorError::Io(format!("failed to spawn '{}': {e}", self.program))
            })?;

        // Feed stdin while stdout drains; either pipe can fill first.
        let stdin = child.stdin.take();
        let payload = render_input(&input);
        let program = self.program.as_str();
        let write_input = async move {
            if let Some(mut stdin) = stdin {
                // A child that exits without reading stdin closes the pipe early.
                if let Err(e) = stdin.write_all(payload.as_bytes()).await {
                    tracing::debug!(program, error = %e, "stdin write failed");
                }
            }
        };

        let ((), output) = tokio::join!(write_input, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExecutorError::failed(format!(
                "command '{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(Value::String(stdout.trim().to_string()))
    }
}
