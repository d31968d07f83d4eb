//! Declarative plan file format.
//!
//! A plan file describes a workflow as data: its name, an optional initial
//! prompt, seed values for the shared store, and an ordered list of steps.
//! Executors are referenced by built-in `type` tags:
//!
//! ```yaml
//! name: digest
//! prompt: "rust news"
//! store:
//!   topics: [async, macros]
//! steps:
//!   - kind: sequence
//!     executors:
//!       - type: template
//!         template: "Summarize: {{input}}"
//!     on_fail:
//!       type: echo
//!   - kind: iterate
//!     key: topics
//!     agent:
//!       type: template
//!       template: "About {{input}}"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::WorkflowConfig;
use crate::step::StepKind;

// ---------------------------------------------------------------------------
// PlanFile
// ---------------------------------------------------------------------------

/// Top-level plan file document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Seed values written to the shared store before the first run.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub store: BTreeMap<String, Value>,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

impl PlanFile {
    /// The workflow construction config described by this file.
    pub fn workflow_config(&self) -> WorkflowConfig {
        WorkflowConfig {
            name: self.name.clone(),
            prompt: self.prompt.clone(),
        }
    }

    /// Check the structural rules serde cannot express.
    ///
    /// Steps are numbered from 1 in error messages.
    pub fn validate(&self) -> Result<(), PlanValidationError> {
        if self.name.trim().is_empty() {
            return Err(PlanValidationError::EmptyName);
        }

        for (idx, step) in self.steps.iter().enumerate() {
            let index = idx + 1;
            if let StepBody::Iterate { items, key, .. } = &step.body {
                match (items, key) {
                    (Some(_), Some(_)) | (None, None) => {
                        return Err(PlanValidationError::IterateSource { index });
                    }
                    _ => {}
                }
            }
            for spec in step.executor_specs() {
                if let ExecutorSpec::Command { program, .. } = spec {
                    if program.trim().is_empty() {
                        return Err(PlanValidationError::EmptyProgram { index });
                    }
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// A single step entry, with its optional handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_success: Option<ExecutorSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_fail: Option<ExecutorSpec>,
    #[serde(flatten)]
    pub body: StepBody,
}

impl StepSpec {
    pub fn kind(&self) -> StepKind {
        match self.body {
            StepBody::Prompt { .. } => StepKind::Prompt,
            StepBody::Sequence { .. } => StepKind::Sequence,
            StepBody::Parallel { .. } => StepKind::Parallel,
            StepBody::Iterate { .. } => StepKind::Iterate,
        }
    }

    /// Every executor spec referenced by this step, handlers included.
    pub fn executor_specs(&self) -> Vec<&ExecutorSpec> {
        let mut specs: Vec<&ExecutorSpec> = match &self.body {
            StepBody::Prompt { .. } => Vec::new(),
            StepBody::Sequence { executors } | StepBody::Parallel { executors } => {
                executors.iter().collect()
            }
            StepBody::Iterate { agent, .. } => vec![agent],
        };
        specs.extend(self.on_success.iter());
        specs.extend(self.on_fail.iter());
        specs
    }
}

/// Kind-specific step payload, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepBody {
    Prompt {
        text: String,
    },
    Sequence {
        #[serde(default)]
        executors: Vec<ExecutorSpec>,
    },
    Parallel {
        #[serde(default)]
        executors: Vec<ExecutorSpec>,
    },
    /// Fan out over literal `items` or an array stored under `key`.
    Iterate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        items: Option<Vec<Value>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        agent: ExecutorSpec,
    },
}

// ---------------------------------------------------------------------------
// Executors
// ---------------------------------------------------------------------------

/// Built-in executor reference, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutorSpec {
    /// Returns its input unchanged.
    Echo,
    /// Substitutes `{{input}}` in the template.
    Template { template: String },
    /// Runs a program with the input on stdin and returns trimmed stdout.
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
    /// Always fails with `message`.
    Fail { message: String },
    /// Waits `ms` milliseconds, then returns its input.
    Sleep { ms: u64 },
    /// Writes its input into the shared store under `key` and returns it.
    StoreSet { key: String },
}

impl ExecutorSpec {
    /// Tag name, used as the default executor name.
    pub fn type_name(&self) -> &'static str {
        match self {
            ExecutorSpec::Echo => "echo",
            ExecutorSpec::Template { .. } => "template",
            ExecutorSpec::Command { .. } => "command",
            ExecutorSpec::Fail { .. } => "fail",
            ExecutorSpec::Sleep { .. } => "sleep",
            ExecutorSpec::StoreSet { .. } => "store_set",
        }
    }
}

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

/// Structural problems in a parsed plan file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanValidationError {
    #[error("plan name must not be empty")]
    EmptyName,

    #[error("step {index}: iterate must set exactly one of `items` or `key`")]
    IterateSource { index: usize },

    #[error("step {index}: command program must not be empty")]
    EmptyProgram { index: usize },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DIGEST: &str = r#"
name: digest
prompt: "rust news"
store:
  topics: [async, macros]
steps:
  - kind: prompt
    text: "override"
  - kind: sequence
    description: summarize
    executors:
      - type: template
        template: "Summarize: {{input}}"
      - type: command
        program: tr
        args: ["a-z", "A-Z"]
    on_fail:
      type: echo
  - kind: parallel
    executors:
      - type: echo
      - type: sleep
        ms: 5
  - kind: iterate
    key: topics
    agent:
      type: template
      template: "About {{input}}"
    on_success:
      type: store_set
      key: results
"#;

    fn parse(yaml: &str) -> PlanFile {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    #[test]
    fn test_parse_full_plan() {
        let plan = parse(DIGEST);
        assert_eq!(plan.name, "digest");
        assert_eq!(plan.prompt.as_deref(), Some("rust news"));
        assert_eq!(plan.store.get("topics"), Some(&json!(["async", "macros"])));
        assert_eq!(plan.steps.len(), 4);

        let kinds: Vec<StepKind> = plan.steps.iter().map(StepSpec::kind).collect();
        assert_eq!(
            kinds,
            vec![
                StepKind::Prompt,
                StepKind::Sequence,
                StepKind::Parallel,
                StepKind::Iterate
            ]
        );
        assert_eq!(plan.steps[1].description.as_deref(), Some("summarize"));
        assert_eq!(plan.steps[1].on_fail, Some(ExecutorSpec::Echo));
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_parse_command_args() {
        let plan = parse(DIGEST);
        match &plan.steps[1].body {
            StepBody::Sequence { executors } => {
                assert_eq!(
                    executors[1],
                    ExecutorSpec::Command {
                        program: "tr".to_string(),
                        args: vec!["a-z".to_string(), "A-Z".to_string()],
                    }
                );
            }
            other => panic!("expected sequence, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_step_kind_rejected() {
        let yaml = r#"
name: bad
steps:
  - kind: branch
    text: nope
"#;
        assert!(serde_yaml_ng::from_str::<PlanFile>(yaml).is_err());
    }

    #[test]
    fn test_unknown_executor_type_rejected() {
        let yaml = r#"
name: bad
steps:
  - kind: sequence
    executors:
      - type: teleport
"#;
        assert!(serde_yaml_ng::from_str::<PlanFile>(yaml).is_err());
    }

    #[test]
    fn test_empty_steps_is_valid() {
        let plan = parse("name: empty\n");
        assert!(plan.steps.is_empty());
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_iterate_requires_exactly_one_source() {
        let both = parse(
            r#"
name: both
steps:
  - kind: iterate
    items: [1, 2]
    key: xs
    agent:
      type: echo
"#,
        );
        assert_eq!(
            both.validate(),
            Err(PlanValidationError::IterateSource { index: 1 })
        );

        let neither = parse(
            r#"
name: neither
steps:
  - kind: prompt
    text: hi
  - kind: iterate
    agent:
      type: echo
"#,
        );
        assert_eq!(
            neither.validate(),
            Err(PlanValidationError::IterateSource { index: 2 })
        );
    }

    #[test]
    fn test_empty_command_program_rejected() {
        let plan = parse(
            r#"
name: cmd
steps:
  - kind: sequence
    executors:
      - type: echo
    on_success:
      type: command
      program: "  "
"#,
        );
        assert_eq!(
            plan.validate(),
            Err(PlanValidationError::EmptyProgram { index: 1 })
        );
    }

    #[test]
    fn test_blank_name_rejected() {
        let plan = parse("name: \"  \"\n");
        assert_eq!(plan.validate(), Err(PlanValidationError::EmptyName));
    }

    #[test]
    fn test_workflow_config_from_plan() {
        let plan = parse(DIGEST);
        let config = plan.workflow_config();
        assert_eq!(config.name, "digest");
        assert_eq!(config.prompt.as_deref(), Some("rust news"));
    }

    #[test]
    fn test_executor_specs_include_handlers() {
        let plan = parse(DIGEST);
        let names: Vec<&str> = plan.steps[3]
            .executor_specs()
            .into_iter()
            .map(ExecutorSpec::type_name)
            .collect();
        assert_eq!(names, vec!["template", "store_set"]);
    }
}
