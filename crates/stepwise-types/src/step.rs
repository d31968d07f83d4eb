//! Step kind tags.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of an execution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Prompt,
    Sequence,
    Parallel,
    Iterate,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Prompt => "prompt",
            StepKind::Sequence => "sequence",
            StepKind::Parallel => "parallel",
            StepKind::Iterate => "iterate",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
