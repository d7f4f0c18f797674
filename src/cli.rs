//! CLI arguments and subcommands for hostpulse.
//!
//! This module defines the command-line interface structure using the
//! clap library, including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "hostpulse",
    about = "Host telemetry daemon with rolling history and a JSON dashboard API",
    long_about = "Host telemetry daemon with rolling history and a JSON dashboard API.\n\n\
                  Samples CPU load, memory, disk, network and temperature readings on a \
                  fixed interval, keeps a bounded rolling window per series, and serves \
                  current values and history as JSON for live dashboards.",
    author = "Michael Moll <pulse@herakles.now>",
    version = "0.1.0",
    propagate_version = true,
    after_help = "Project: https://github.com/cansp-dev/hostpulse"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// HTTP listen port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Log level
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Sampling interval in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Rolling window size in samples per series
    #[arg(long)]
    pub window: Option<usize>,

    /// Snapshot acquisition timeout in milliseconds
    #[arg(long)]
    pub acquire_timeout_ms: Option<u64>,

    /// Disable CPU load sampling
    #[arg(long)]
    pub disable_cpu: bool,

    /// Disable memory sampling
    #[arg(long)]
    pub disable_memory: bool,

    /// Disable disk sampling
    #[arg(long)]
    pub disable_disk: bool,

    /// Disable network sampling
    #[arg(long)]
    pub disable_network: bool,

    /// Disable temperature sampling
    #[arg(long)]
    pub disable_temperature: bool,

    /// Use the synthetic telemetry provider instead of /proc
    #[arg(long)]
    pub synthetic: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe every metric category once and print the readings
    Check {
        /// Print raw provider readings instead of normalized values
        #[arg(long)]
        raw: bool,
    },
}
