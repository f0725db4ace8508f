//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output = output.unwrap_or_else(|| PathBuf::from("herakles-iostat-exporter.yaml"));

    let mut content = render_config(&config, &format)?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# Herakles iostat Exporter Configuration
# =======================================
#
# Server Configuration
# --------------------
# bind: "0.0.0.0"              # Bind IP (0.0.0.0 = all interfaces)
# port: 9216                   # HTTP port
# cache_ttl: 5                 # Reuse collected statistics for N seconds
# enable_health: true          # Enable /health endpoint
#
# Logging
# -------
# log_level: "info"            # off, error, warn, info, debug, trace
# verbose: false               # Log collection details (alias: Verbose)
#
# Collection
# ----------
# host: null                   # Host label (alias: Host, null = system hostname)
# interval: 1                  # iostat interval in seconds (alias: Interval)
# count: 1                     # Samples per invocation, only the last is used
# unit: "blocks"               # blocks, kb or mb (alias: Unit)
# devices: null                # Only collect these devices, e.g. ["sda", "nvme0n1"]
# iostat_binary: "/usr/bin/iostat"
# command_timeout: 10          # Seconds before an iostat invocation is killed
#
# Captured Reports
# ----------------
# basic_report_file: null      # Output of `iostat -y -d`, replayed instead of running iostat
# extended_report_file: null   # Output of `iostat -y -x`
#
# TLS/SSL Configuration
# ---------------------
# enable_tls: false            # Enable HTTPS (default: false)
# tls_cert_path: null          # Path to TLS certificate (PEM format)
# tls_key_path: null           # Path to TLS private key (PEM format)
"#;

    format!("{comments}\n{yaml}")
}
