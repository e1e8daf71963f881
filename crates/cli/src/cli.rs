//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Upload Gate - Pre-transfer validation and per-item configuration core
#[derive(Parser, Debug)]
#[command(
    name = "upload-gate",
    author,
    version,
    about = "Upload pre-transfer decision core",
    long_about = "Decision layer for a client-side upload coordinator.\n\n\
                  Gates every item through checked callbacks (synchronous or \n\
                  deferred), resolves per-item endpoint and parameter overrides, \n\
                  and hands fully-resolved requests to the transport layer."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "UPLOAD_GATE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "UPLOAD_GATE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a mock upload session against the decision core
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "UPLOAD_GATE_CONFIG"
    )]
    pub config: PathBuf,

    /// Number of synthetic items to submit
    #[arg(long, default_value = "8", env = "UPLOAD_GATE_ITEMS")]
    pub items: u64,

    /// Size-check threshold in KiB; larger items are refused
    #[arg(long, default_value = "1024", env = "UPLOAD_GATE_MAX_SIZE_KB")]
    pub max_size_kb: u64,

    /// Route checks through a deferred quota decision settled after this
    /// many milliseconds (0 = synchronous checks)
    #[arg(long, default_value = "0", env = "UPLOAD_GATE_ASYNC_QUOTA_MS")]
    pub async_quota_ms: u64,

    /// Override the configured baseline endpoint
    #[arg(long, env = "UPLOAD_GATE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "UPLOAD_GATE_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without running the session
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show default request parameters
    #[arg(long)]
    pub params: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
