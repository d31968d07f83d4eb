//! Stepwise CLI entry point.
//!
//! Binary name: `stepwise`
//!
//! Parses CLI arguments, loads `stepwise.toml`, installs tracing, then
//! dispatches to the command handler.

mod cli;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use clap_complete::generate;

use stepwise_infra::config::{CONFIG_FILE_NAME, load_global_config};
use stepwise_observe::tracing_setup::{init_tracing, shutdown_tracing};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions need neither config nor tracing
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "stepwise", &mut std::io::stdout());
        return Ok(());
    }

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    let config = load_global_config(&config_path).await;

    let filter = cli::log_filter(cli.verbose, cli.quiet, config.log_filter.as_deref());
    init_tracing(config.otel || cli.otel, &filter)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;
    tracing::debug!(path = %config_path.display(), ?config, "configuration loaded");

    let result = match cli.command {
        Commands::Run { plan, show_plan } => {
            cli::run::run_plan(&plan, show_plan, cli.json, cli.quiet).await
        }
        Commands::Loop { plan, delay_ms } => {
            let delay = Duration::from_millis(delay_ms.unwrap_or(config.loop_delay_ms));
            cli::looping::loop_plan(&plan, delay, cli.json, cli.quiet).await
        }
        Commands::Validate { plan, print_yaml } => {
            cli::validate::validate_plan(&plan, print_yaml, cli.json).await
        }
        Commands::Completions { .. } => unreachable!("handled above"),
    };

    shutdown_tracing();
    result
}
