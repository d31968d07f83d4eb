//! `stepwise validate`: check a plan file without running it.
//!
//! `--print-yaml` echoes the plan back in its normalized YAML form.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use stepwise_infra::assemble::build_workflow;
use stepwise_infra::plan_file::{load_plan_file, serialize_plan_yaml};
use stepwise_types::plan::PlanFile;

pub async fn validate_plan(plan: &Path, print_yaml: bool, json: bool) -> Result<()> {
    let file = load_plan_file(plan)
        .await
        .with_context(|| format!("Plan {} is invalid", plan.display()))?;
    let workflow = build_workflow(&file)
        .with_context(|| format!("Plan {} is invalid", plan.display()))?;

    if print_yaml {
        print!("{}", normalized_yaml(&file)?);
        return Ok(());
    }

    if json {
        let steps: Vec<_> = file
            .steps
            .iter()
            .zip(workflow.plan().steps())
            .enumerate()
            .map(|(idx, (spec, step))| {
                serde_json::json!({
                    "index": idx + 1,
                    "kind": spec.kind(),
                    "description": step.description,
                    "executors": spec
                        .executor_specs()
                        .iter()
                        .map(|e| e.type_name())
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        let out = serde_json::json!({
            "name": file.name,
            "valid": true,
            "store_keys": file.store.keys().collect::<Vec<_>>(),
            "steps": steps,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!();
        println!(
            "  {} Plan '{}' is valid",
            style("✓").green().bold(),
            style(&file.name).cyan()
        );
        println!("  Steps: {}", file.steps.len());
        if !file.store.is_empty() {
            let keys: Vec<&str> = file.store.keys().map(String::as_str).collect();
            println!("  Store keys: {}", keys.join(", "));
        }
        println!();
        for line in workflow.plan().to_string().lines() {
            println!("    {line}");
        }
        println!();
    }

    Ok(())
}

/// The plan as the engine sees it, with defaults filled in.
fn normalized_yaml(file: &PlanFile) -> Result<String> {
    serialize_plan_yaml(file).context("Failed to render plan as YAML")
}
