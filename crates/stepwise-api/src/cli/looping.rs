//! `stepwise loop`: re-run a plan file until interrupted.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;

use stepwise_infra::assemble::load_workflow;

pub async fn loop_plan(plan: &Path, delay: Duration, json: bool, quiet: bool) -> Result<()> {
    let workflow = load_workflow(plan)
        .await
        .with_context(|| format!("Failed to load plan {}", plan.display()))?;
    let name = workflow.name().to_string();

    if !json && !quiet {
        println!();
        println!(
            "  {} Looping workflow '{}' every {}ms",
            style("*").green().bold(),
            style(&name).cyan(),
            delay.as_millis()
        );
        println!("  {}", style("Press Ctrl+C to stop").dim());
    }

    let handle = workflow.spawn_loop(delay);

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    let stopped = handle
        .stop()
        .await
        .with_context(|| format!("Loop for '{name}' did not stop cleanly"))?;
    let iterations = stopped.iterations;

    if json {
        let out = serde_json::json!({
            "workflow": name,
            "iterations": iterations,
            "shared_store": stopped.workflow.store().snapshot(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if !quiet {
        println!();
        println!("  Loop stopped after {iterations} iteration(s).");
        println!();
    }

    Ok(())
}
