//! `stepwise run`: execute a plan file once.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use serde_json::Value;

use stepwise_core::RunOutcome;
use stepwise_infra::assemble::load_workflow;

pub async fn run_plan(plan: &Path, show_plan: bool, json: bool, quiet: bool) -> Result<()> {
    let mut workflow = load_workflow(plan)
        .await
        .with_context(|| format!("Failed to load plan {}", plan.display()))?;

    if show_plan {
        workflow.debug();
        if !json && !quiet {
            println!();
            println!("  {} Plan '{}'", style("*").cyan().bold(), style(workflow.name()).cyan());
            for line in workflow.plan().to_string().lines() {
                println!("    {line}");
            }
        }
    }

    let outcome = workflow
        .run()
        .await
        .with_context(|| format!("Workflow '{}' failed", workflow.name()))?;

    if json {
        let mut out = serde_json::to_value(&outcome)?;
        if let Value::Object(map) = &mut out {
            map.insert("workflow".to_string(), Value::String(workflow.name().to_string()));
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if quiet {
        if let Some(output) = &outcome.final_output {
            println!("{}", render(output));
        }
    } else {
        print_outcome(workflow.name(), &outcome)?;
    }

    Ok(())
}

fn print_outcome(name: &str, outcome: &RunOutcome) -> Result<()> {
    let elapsed = outcome.finished_at - outcome.started_at;

    println!();
    println!(
        "  {} Workflow '{}' finished",
        style("*").green().bold(),
        style(name).cyan()
    );
    println!("  Run ID: {}", outcome.run_id);
    println!("  Steps: {}", outcome.steps_executed);
    println!("  Duration: {}ms", elapsed.num_milliseconds());
    println!();

    match &outcome.final_output {
        Some(output) => {
            println!("  {}", style("Output").bold());
            for line in serde_json::to_string_pretty(output)?.lines() {
                println!("    {line}");
            }
        }
        None => println!("  {}", style("(empty plan, no output)").dim()),
    }

    if !outcome.shared_store.is_empty() {
        println!();
        println!("  {}", style("Shared store").bold());
        for (key, value) in &outcome.shared_store {
            println!("    {} = {}", style(key).yellow(), value);
        }
    }
    println!();

    Ok(())
}

/// Strings print raw; everything else as compact JSON.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
