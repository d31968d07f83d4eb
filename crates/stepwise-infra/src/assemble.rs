//! Build a runnable [`Workflow`] from a [`PlanFile`].

use std::path::Path;

use stepwise_core::{BoxExecutor, IterateSource, SharedStore, StepPayload, Workflow};
use stepwise_types::plan::{ExecutorSpec, PlanFile, PlanValidationError, StepBody};

use crate::executors::build_executor;
use crate::plan_file::{PlanFileError, load_plan_file};

/// Assemble a workflow: seed the store, then add each step with its handlers.
///
/// Step executors are also recorded with `register_agent`.
pub fn build_workflow(plan: &PlanFile) -> Result<Workflow, PlanValidationError> {
    plan.validate()?;

    let mut workflow = Workflow::new(plan.workflow_config());
    let store = workflow.store().clone();

    for (key, value) in &plan.store {
        workflow.shared_store(key.clone(), value.clone());
    }

    for (idx, spec) in plan.steps.iter().enumerate() {
        let payload = match &spec.body {
            StepBody::Prompt { text } => StepPayload::Prompt(text.clone()),
            StepBody::Sequence { executors } => StepPayload::Sequence(build_all(executors, &store)),
            StepBody::Parallel { executors } => StepPayload::Parallel(build_all(executors, &store)),
            StepBody::Iterate { items, key, agent } => {
                let items = match (items, key) {
                    (Some(items), None) => IterateSource::Items(items.clone()),
                    (None, Some(key)) => IterateSource::StoreKey(key.clone()),
                    _ => return Err(PlanValidationError::IterateSource { index: idx + 1 }),
                };
                StepPayload::Iterate {
                    items,
                    agent: build_executor(agent, &store),
                }
            }
        };

        let agents: Vec<_> = match &payload {
            StepPayload::Prompt(_) => Vec::new(),
            StepPayload::Sequence(executors) | StepPayload::Parallel(executors) => {
                executors.clone()
            }
            StepPayload::Iterate { agent, .. } => vec![agent.clone()],
        };
        for agent in agents {
            workflow.register_agent(agent);
        }

        let description = spec
            .description
            .clone()
            .unwrap_or_else(|| payload.describe());
        workflow.add_step(payload, description);

        if let Some(handler) = &spec.on_success {
            workflow.on_success(build_executor(handler, &store));
        }
        if let Some(handler) = &spec.on_fail {
            workflow.on_fail(build_executor(handler, &store));
        }
    }

    tracing::debug!(
        workflow = workflow.name(),
        steps = workflow.plan().len(),
        store_keys = workflow.store().len(),
        "workflow assembled"
    );
    Ok(workflow)
}

/// Load a plan file and assemble its workflow.
pub async fn load_workflow(path: &Path) -> Result<Workflow, PlanFileError> {
    let plan = load_plan_file(path).await?;
    Ok(build_workflow(&plan)?)
}

fn build_all(specs: &[ExecutorSpec], store: &SharedStore) -> Vec<BoxExecutor> {
    specs.iter().map(|spec| build_executor(spec, store)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan_file::parse_plan_yaml;
    use serde_json::json;
    use stepwise_types::step::StepKind;
    use tempfile::TempDir;

    fn workflow_from(yaml: &str) -> Workflow {
        build_workflow(&parse_plan_yaml(yaml).unwrap()).unwrap()
    }

    #[test]
    fn test_build_maps_steps_and_handlers() {
        let wf = workflow_from(
            r#"
name: mapped
prompt: start
store:
  xs: [1, 2]
steps:
  - kind: prompt
    text: hi
  - kind: sequence
    description: custom label
    executors:
      - type: echo
      - type: template
        template: "<{{input}}>"
    on_success:
      type: echo
    on_fail:
      type: echo
  - kind: parallel
    executors:
      - type: echo
  - kind: iterate
    key: xs
    agent:
      type: echo
"#,
        );

        assert_eq!(wf.name(), "mapped");
        assert_eq!(wf.current_prompt(), Some("start"));
        assert_eq!(wf.store().get("xs"), Some(json!([1, 2])));

        let steps = wf.plan().steps();
        let kinds: Vec<StepKind> = steps.iter().map(|s| s.kind()).collect();
        assert_eq!(
            kinds,
            vec![StepKind::Prompt, StepKind::Sequence, StepKind::Parallel, StepKind::Iterate]
        );
        assert_eq!(steps[1].description, "custom label");
        assert!(steps[1].on_success.is_some());
        assert!(steps[1].on_fail.is_some());
        assert_eq!(steps[2].description, "parallel: echo");
        assert_eq!(wf.agents().len(), 4);
    }

    #[tokio::test]
    async fn test_assembled_workflow_runs() {
        let mut wf = workflow_from(
            r#"
name: run
prompt: world
steps:
  - kind: sequence
    executors:
      - type: template
        template: "hello {{input}}"
      - type: store_set
        key: greeting
  - kind: iterate
    items: [a, b]
    agent:
      type: template
      template: "{{input}}!"
"#,
        );

        let outcome = wf.run().await.unwrap();
        assert_eq!(outcome.final_output, Some(json!(["a!", "b!"])));
        assert_eq!(outcome.shared_store.get("greeting"), Some(&json!("hello world")));
    }

    #[tokio::test]
    async fn test_assembled_on_fail_absorbs() {
        let mut wf = workflow_from(
            r#"
name: recover
steps:
  - kind: sequence
    executors:
      - type: fail
        message: boom
    on_fail:
      type: template
      template: "recovered from {{input}}"
"#,
        );
        let outcome = wf.run().await.unwrap();
        assert_eq!(outcome.final_output, Some(json!("recovered from boom")));
    }

    #[tokio::test]
    async fn test_assembled_failure_aborts() {
        let mut wf = workflow_from(
            r#"
name: abort
steps:
  - kind: sequence
    executors:
      - type: fail
        message: boom
"#,
        );
        let err = wf.run().await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_build_rejects_invalid_plan() {
        let plan = PlanFile {
            name: "  ".to_string(),
            prompt: None,
            store: Default::default(),
            steps: Vec::new(),
        };
        assert_eq!(
            build_workflow(&plan).unwrap_err(),
            PlanValidationError::EmptyName
        );
    }

    #[tokio::test]
    async fn test_load_workflow_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("plan.yaml");
        tokio::fs::write(&path, "name: from-file\nsteps:\n  - kind: prompt\n    text: x\n")
            .await
            .unwrap();

        let mut wf = load_workflow(&path).await.unwrap();
        let outcome = wf.run().await.unwrap();
        assert_eq!(outcome.final_output, Some(json!("x")));
    }
}
