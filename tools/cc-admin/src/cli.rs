//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CC-Admin: Custody-Chain operator CLI
#[derive(Parser, Debug)]
#[command(name = "cc-admin")]
#[command(about = "Run custody ledger operations against a local store file")]
pub struct Cli {
    /// Path of the ledger store file (created on first write)
    #[arg(short, long, env = "CC_DATA_PATH", default_value = "custody.db")]
    pub data: PathBuf,

    /// Emit logs as JSON instead of human-readable text
    #[arg(long, env = "CC_JSON_LOGS")]
    pub json_logs: bool,

    /// Print Prometheus metrics to stderr when done
    #[arg(long)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one operation, e.g. `call Transfer R1 P1 L1 60`
    Call {
        /// Operation name or legacy alias
        operation: String,

        /// Positional string arguments
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run operations from a file, one JSON array per line:
    /// `["Collect", "L1", "Plastic", "recyclable", "100", "R1"]`
    Batch {
        /// Script path, or `-` for stdin
        script: PathBuf,

        /// Keep going after a rejected operation
        #[arg(long)]
        keep_going: bool,
    },

    /// List operation names and their legacy aliases
    Operations,
}
