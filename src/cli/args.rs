//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::Parser;

/// Periodic health checker for LLM API gateway channels.
#[derive(Parser, Debug)]
#[command(name = "chanwatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(
        short,
        long,
        value_name = "PATH",
        env = "CHANWATCH_CONFIG",
        default_value = "chanwatch.toml"
    )]
    pub config: PathBuf,

    /// Run a single test cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Compute and report diffs without writing to the store
    #[arg(long)]
    pub dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Emit JSONL logs to stderr
    #[arg(long)]
    pub json_output: bool,

    /// Verbose output (sets log level to debug)
    #[arg(short, long)]
    pub verbose: bool,
}
