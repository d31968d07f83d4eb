//! CLI command definitions for the `stepwise` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod looping;
pub mod run;
pub mod validate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use stepwise_observe::tracing_setup::filter_for_verbosity;

/// Run declarative workflow plans.
#[derive(Parser)]
#[command(name = "stepwise", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the config file (default: ./stepwise.toml).
    #[arg(long, global = true, env = "STEPWISE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a plan file once and print its result.
    Run {
        /// Path to the plan YAML file.
        plan: PathBuf,

        /// Print the assembled plan before running it.
        #[arg(long)]
        show_plan: bool,
    },

    /// Run a plan file repeatedly until Ctrl+C.
    Loop {
        /// Path to the plan YAML file.
        plan: PathBuf,

        /// Delay between iterations in milliseconds (default from config).
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Parse and validate a plan file without running it.
    Validate {
        /// Path to the plan YAML file.
        plan: PathBuf,

        /// Print the normalized plan as YAML instead of a summary.
        #[arg(long)]
        print_yaml: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Pick the tracing filter directive.
///
/// `-v` wins, then `--quiet`, then the config file's `log_filter`.
pub fn log_filter(verbose: u8, quiet: bool, configured: Option<&str>) -> String {
    match (verbose, quiet, configured) {
        (0, true, _) => "error".to_string(),
        (0, false, Some(directive)) => directive.to_string(),
        (v, _, _) => filter_for_verbosity(v).to_string(),
    }
}
