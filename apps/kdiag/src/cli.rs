//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// kdiag - Error diagnostics and remediation for Kubernetes tooling
#[derive(Parser)]
#[command(name = "kdiag")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Error diagnostics and remediation for Kubernetes tooling")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to the kdiag log directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Append diagnostic log entries to this file
    #[arg(long, global = true, value_name = "PATH", env = "KDIAG_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Answer every prompt with the choice carrying this label
    #[arg(long, global = true, value_name = "LABEL")]
    pub answer: Option<String>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Raise one error through a domain handler
    #[command(alias = "sim")]
    Simulate {
        #[command(subcommand)]
        domain: SimulateCommands,
    },

    /// Handle every report in a JSON-lines file
    Replay {
        /// File with one JSON report per line
        file: PathBuf,
    },
}

/// Failure domains that can be simulated
#[derive(Subcommand)]
pub enum SimulateCommands {
    /// Cluster unreachable
    Connection {
        /// Cluster name
        #[arg(long, default_value = "default")]
        cluster: String,

        /// Underlying failure text
        #[arg(long, default_value = "connection refused")]
        reason: String,
    },

    /// Cluster CLI missing from PATH
    #[command(name = "cli-missing")]
    CliMissing,

    /// Request denied by RBAC
    Permission {
        #[arg(long, default_value = "get")]
        verb: String,

        #[arg(long, default_value = "pods")]
        resource: String,

        /// Namespace (omit for cluster-scoped resources)
        #[arg(short, long)]
        namespace: Option<String>,
    },

    /// Resource missing
    #[command(name = "not-found")]
    NotFound {
        /// Resource name
        name: String,

        #[arg(long = "type", default_value = "pod")]
        resource_type: String,

        #[arg(short, long)]
        namespace: Option<String>,
    },

    /// Operation exceeded its deadline
    Timeout {
        #[arg(long, default_value = "list pods")]
        operation: String,

        /// Elapsed time in milliseconds
        #[arg(long, default_value_t = 5_000)]
        elapsed_ms: u64,

        /// Raise the same timeout this many times
        #[arg(long, default_value_t = 1)]
        repeat: u32,
    },

    /// API call failed with an HTTP status
    Api {
        /// HTTP status code
        status: u16,

        #[arg(long, default_value = "request failed")]
        message: String,

        /// Response header as NAME=VALUE (repeatable)
        #[arg(long = "header", value_name = "NAME=VALUE", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Raw response body
        #[arg(long)]
        body: Option<String>,
    },

    /// Invalid user input
    Validation {
        field: String,
        reason: String,
    },

    /// Unclassified failure
    Unexpected {
        /// Failure text
        message: String,

        #[arg(long, default_value = "refresh tree")]
        operation: String,
    },
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(name, _)| !name.trim().is_empty())
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))
}
