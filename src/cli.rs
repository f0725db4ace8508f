//! CLI arguments and subcommands for herakles-iostat-exporter.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
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
    name = "herakles-iostat-exporter",
    about = "Prometheus exporter for per-device iostat statistics",
    long_about = "Prometheus exporter for per-device iostat statistics.\n\n\
                  Runs the sysstat iostat utility for basic (-d) and extended (-x) \
                  device reports, merges both per block device and exposes every \
                  recognized column as a metric.",
    author = "Michael Moll <exporter@herakles.now> - Herakles",
    version,
    propagate_version = true
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

    /// Log level [default: config file log_level, else info]
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

    /// Reuse collected statistics for N seconds
    #[arg(long)]
    pub cache_ttl: Option<u64>,

    /// Disable /health endpoint
    #[arg(long)]
    pub disable_health: bool,

    /// Log verbose collection details (unrecognized statistics etc.)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Host name attached to every dispatched value
    #[arg(long)]
    pub host: Option<String>,

    /// iostat sampling interval in seconds
    #[arg(short = 'i', long)]
    pub interval: Option<u64>,

    /// Number of iostat samples per invocation (only the last is used)
    #[arg(long)]
    pub count: Option<u32>,

    /// Report unit: blocks, kb or mb
    #[arg(long)]
    pub unit: Option<String>,

    /// Only collect these devices (comma-separated)
    #[arg(short = 'd', long)]
    pub devices: Option<String>,

    /// Path to the iostat binary
    #[arg(long)]
    pub iostat_binary: Option<PathBuf>,

    /// Seconds to wait for one iostat invocation
    #[arg(long)]
    pub command_timeout: Option<u64>,

    /// Replay a captured `iostat -y -d` report instead of running iostat
    #[arg(long, requires = "extended_report")]
    pub basic_report: Option<PathBuf>,

    /// Replay a captured `iostat -y -x` report instead of running iostat
    #[arg(long, requires = "basic_report")]
    pub extended_report: Option<PathBuf>,

    /// Enable TLS/SSL for HTTPS
    #[arg(long)]
    pub enable_tls: bool,

    /// Path to TLS certificate file (PEM format)
    #[arg(long)]
    pub tls_cert: Option<PathBuf>,

    /// Path to TLS private key file (PEM format)
    #[arg(long)]
    pub tls_key: Option<PathBuf>,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration and system requirements
    Check {
        /// Also run one full collection cycle
        #[arg(long)]
        collect: bool,
    },

    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },

    /// Run collection cycles and print the merged statistics
    Test {
        /// Number of collection cycles
        #[arg(short = 'n', long, default_value_t = 1)]
        iterations: usize,

        /// Show how each statistic is dispatched
        #[arg(long)]
        verbose: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,
    },

    /// List the recognized iostat statistics and their metric names
    Stats {
        /// Filter by metric kind (gauge, counter, percent)
        #[arg(short = 'k', long)]
        kind: Option<String>,
    },
}
