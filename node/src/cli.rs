//! # CLI Interface
//!
//! Defines the command-line argument structure for `claw-node` using
//! `clap` derive. Supports three subcommands: `run`, `keygen`, and
//! `version`.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Claw agent memory node.
///
/// A standalone memory service for autonomous agents. Registers Ed25519
/// identities, verifies signed requests, stores encrypted memory versions,
/// serves the REST API, and exposes Prometheus metrics.
#[derive(Parser, Debug)]
#[command(
    name = "claw-node",
    about = "Claw agent memory node",
    version,
    propagate_version = true
)]
pub struct ClawNodeCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the Claw node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the memory node.
    Run(RunArgs),
    /// Generate an agent identity offline — prints the agent ID, public
    /// key, and recovery phrase without talking to any service.
    Keygen,
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the node data directory where the identity and memory
    /// tables are stored.
    ///
    /// Created on first run if it does not exist.
    #[arg(long, short = 'd', env = "CLAW_DATA_DIR", default_value = "~/.claw")]
    pub data_dir: PathBuf,

    /// Port for the REST API.
    #[arg(long, env = "CLAW_API_PORT", default_value_t = claw_protocol::config::DEFAULT_API_PORT)]
    pub api_port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "CLAW_METRICS_PORT", default_value_t = claw_protocol::config::DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,

    /// Signature freshness window in seconds. Signed requests with
    /// timestamps further than this from server time are rejected.
    #[arg(
        long,
        env = "CLAW_FRESHNESS_WINDOW_SECS",
        default_value_t = claw_protocol::config::DEFAULT_FRESHNESS_WINDOW.as_secs()
    )]
    pub freshness_window_secs: u64,

    /// Run with in-memory storage only. Nothing touches the data
    /// directory and all identities and memories vanish on shutdown.
    #[arg(long, env = "CLAW_EPHEMERAL", default_value_t = false)]
    pub ephemeral: bool,

    /// Log output format.
    #[arg(long, env = "CLAW_LOG_FORMAT", value_enum, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Log output format for the node.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output for local development.
    Pretty,
    /// JSON lines for log aggregation.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        ClawNodeCli::command().debug_assert();
    }

    #[test]
    fn run_defaults() {
        let cli = ClawNodeCli::parse_from(["claw-node", "run"]);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.api_port, claw_protocol::config::DEFAULT_API_PORT);
                assert_eq!(
                    args.freshness_window_secs,
                    claw_protocol::config::DEFAULT_FRESHNESS_WINDOW.as_secs()
                );
                assert_eq!(args.log_format, LogFormat::Pretty);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn log_format_parses_from_flag() {
        let cli = ClawNodeCli::parse_from(["claw-node", "run", "--log-format", "json"]);
        match cli.command {
            Commands::Run(args) => assert_eq!(args.log_format, LogFormat::Json),
            other => panic!("expected run, got {other:?}"),
        }
    }
}
