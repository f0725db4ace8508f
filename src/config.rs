//! Configuration management for herakles-iostat-exporter.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats. The collectd
//! style keys `Verbose`, `Host`, `Interval` and `Unit` are accepted as aliases.

use crate::cli::{Args, ConfigFormat, LogLevel};
use anyhow::{anyhow, Context};
use herakles_iostat_exporter::iostat::runner::DEFAULT_IOSTAT_BINARY;
use herakles_iostat_exporter::{CapturedReports, CommandRunner, DeviceFilter, IostatCommand};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use clap::ValueEnum;
use tracing::{info, warn};

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9216;
pub const DEFAULT_CACHE_TTL: u64 = 5;
pub const DEFAULT_INTERVAL: u64 = 1;
pub const DEFAULT_COUNT: u32 = 1;
pub const DEFAULT_COMMAND_TIMEOUT: u64 = 10;

/// Configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub cache_ttl: Option<u64>,
    pub enable_health: Option<bool>,

    // Logging
    pub log_level: Option<String>,
    #[serde(alias = "Verbose")]
    pub verbose: Option<bool>,

    // Collection
    #[serde(alias = "Host")]
    pub host: Option<String>,
    /// Sampling interval in seconds
    #[serde(alias = "Interval")]
    pub interval: Option<u64>,
    /// "blocks" | "kb" | "mb"
    #[serde(alias = "Unit")]
    pub unit: Option<String>,
    #[serde(alias = "Count")]
    pub count: Option<u32>,
    #[serde(alias = "Devices")]
    pub devices: Option<Vec<String>>,
    #[serde(alias = "iostat-binary")]
    pub iostat_binary: Option<PathBuf>,
    /// Seconds to wait for one iostat invocation
    #[serde(alias = "command-timeout")]
    pub command_timeout: Option<u64>,

    /// Captured reports replayed instead of running iostat
    #[serde(alias = "basic-report-file")]
    pub basic_report_file: Option<PathBuf>,
    #[serde(alias = "extended-report-file")]
    pub extended_report_file: Option<PathBuf>,

    // TLS/SSL Configuration
    #[serde(alias = "enable-tls")]
    pub enable_tls: Option<bool>,
    #[serde(alias = "tls-cert-path")]
    pub tls_cert_path: Option<String>,
    #[serde(alias = "tls-key-path")]
    pub tls_key_path: Option<String>,

    /// Keys not recognized above; reported once at startup and ignored.
    #[serde(flatten)]
    pub unknown: BTreeMap<String, serde_json::Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            port: Some(DEFAULT_PORT),
            cache_ttl: Some(DEFAULT_CACHE_TTL),
            enable_health: Some(true),
            log_level: Some("info".into()),
            verbose: Some(false),
            host: None,
            interval: Some(DEFAULT_INTERVAL),
            unit: Some("blocks".into()),
            count: Some(DEFAULT_COUNT),
            devices: None,
            iostat_binary: Some(PathBuf::from(DEFAULT_IOSTAT_BINARY)),
            command_timeout: Some(DEFAULT_COMMAND_TIMEOUT),
            basic_report_file: None,
            extended_report_file: None,
            enable_tls: Some(false),
            tls_cert_path: None,
            tls_key_path: None,
            unknown: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Effective log level; unset means info.
    pub fn log_level(&self) -> Result<LogLevel, String> {
        match self.log_level.as_deref() {
            None => Ok(LogLevel::Info),
            Some(level) => LogLevel::from_str(level, true).map_err(|_| {
                format!(
                    "Invalid log_level '{}', expected off, error, warn, info, debug or trace",
                    level
                )
            }),
        }
    }

    pub fn verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval.unwrap_or(DEFAULT_INTERVAL))
    }

    pub fn count(&self) -> u32 {
        self.count.unwrap_or(DEFAULT_COUNT)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout.unwrap_or(DEFAULT_COMMAND_TIMEOUT))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl.unwrap_or(DEFAULT_CACHE_TTL))
    }

    /// Host name attached to dispatched values, falling back to the system hostname.
    pub fn host(&self) -> String {
        match self.host.as_deref() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => nix::unistd::gethostname()
                .ok()
                .and_then(|h| h.into_string().ok())
                .unwrap_or_else(|| "localhost".to_string()),
        }
    }

    pub fn device_filter(&self) -> DeviceFilter {
        self.devices.iter().flatten().map(|d| d.trim()).collect()
    }

    pub fn iostat_binary(&self) -> PathBuf {
        self.iostat_binary
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IOSTAT_BINARY))
    }

    /// Whether collection replays captured reports instead of running iostat.
    pub fn uses_captured_reports(&self) -> bool {
        self.basic_report_file.is_some() && self.extended_report_file.is_some()
    }

    /// Builds the command runner described by this configuration.
    pub fn command_runner(&self) -> Arc<dyn CommandRunner> {
        match (&self.basic_report_file, &self.extended_report_file) {
            (Some(basic), Some(extended)) => {
                Arc::new(CapturedReports::new(basic.clone(), extended.clone()))
            }
            _ => Arc::new(
                IostatCommand::new(self.iostat_binary(), self.command_timeout())
                    .with_unit_flag(unit_flag(self.unit.as_deref()).ok().flatten()),
            ),
        }
    }

    /// Names of configuration keys that were not recognized.
    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.unknown.keys().map(String::as_str)
    }

    /// Logs every unrecognized configuration key once.
    pub fn warn_unknown_keys(&self) {
        for key in self.unknown_keys() {
            warn!("Ignoring unknown config option: {}", key);
        }
    }
}

/// Maps the configured unit to the iostat flag selecting it.
pub fn unit_flag(unit: Option<&str>) -> Result<Option<&'static str>, String> {
    match unit.map(|u| u.to_ascii_lowercase()).as_deref() {
        None | Some("blocks") | Some("") => Ok(None),
        Some("kb") | Some("k") => Ok(Some("-k")),
        Some("mb") | Some("m") => Ok(Some("-m")),
        Some(other) => Err(format!(
            "Invalid unit '{}', expected 'blocks', 'kb' or 'mb'",
            other
        )),
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let interval = cfg.interval.unwrap_or(DEFAULT_INTERVAL);
    let count = cfg.count();
    let timeout = cfg.command_timeout.unwrap_or(DEFAULT_COMMAND_TIMEOUT);

    if interval == 0 {
        return Err("interval must be at least 1 second".into());
    }
    if count == 0 {
        return Err("count must be at least 1".into());
    }
    if timeout == 0 {
        return Err("command_timeout must be at least 1 second".into());
    }
    // iostat -y waits interval * count seconds before printing anything.
    if timeout <= interval.saturating_mul(u64::from(count)) {
        return Err(format!(
            "command_timeout ({}s) must be greater than interval * count ({}s)",
            timeout,
            interval.saturating_mul(u64::from(count))
        )
        .into());
    }

    unit_flag(cfg.unit.as_deref())?;
    cfg.log_level()?;

    // Captured reports
    match (&cfg.basic_report_file, &cfg.extended_report_file) {
        (Some(_), None) => {
            return Err("basic_report_file is set but extended_report_file is not".into());
        }
        (None, Some(_)) => {
            return Err("extended_report_file is set but basic_report_file is not".into());
        }
        (Some(basic), Some(extended)) => {
            for path in [basic, extended] {
                if !path.exists() {
                    return Err(format!("Report file not found: {}", path.display()).into());
                }
            }
        }
        (None, None) => {}
    }

    // TLS validation
    if cfg.enable_tls.unwrap_or(false) {
        let cert_path = cfg.tls_cert_path.as_deref();
        let key_path = cfg.tls_key_path.as_deref();

        match (cert_path, key_path) {
            (None, None) => {
                return Err(
                    "TLS is enabled but neither tls_cert_path nor tls_key_path are set".into(),
                );
            }
            (Some(_), None) => {
                return Err("TLS is enabled but tls_key_path is not set".into());
            }
            (None, Some(_)) => {
                return Err("TLS is enabled but tls_cert_path is not set".into());
            }
            (Some(cert), Some(key)) => {
                check_pem_file(cert, "certificate")?;
                check_pem_file(key, "private key")?;
            }
        }
    }

    Ok(())
}

fn check_pem_file(path: &str, what: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !Path::new(path).exists() {
        return Err(format!("TLS {} file not found: {}", what, path).into());
    }
    match fs::metadata(path) {
        Ok(meta) if meta.len() == 0 => Err(format!("TLS {} file is empty: {}", what, path).into()),
        Err(e) => Err(format!("TLS {} file is not readable: {} ({})", what, path, e).into()),
        Ok(_) => Ok(()),
    }
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }
    if let Some(cli_port) = args.port {
        config.port = Some(cli_port);
    }
    if let Some(cache_ttl) = args.cache_ttl {
        config.cache_ttl = Some(cache_ttl);
    }
    if args.disable_health {
        config.enable_health = Some(false);
    }
    if args.verbose {
        config.verbose = Some(true);
    }
    if let Some(level) = args.log_level {
        config.log_level = Some(level.as_str().to_string());
    }

    // Collection settings
    if let Some(host) = &args.host {
        config.host = Some(host.clone());
    }
    if let Some(interval) = args.interval {
        config.interval = Some(interval);
    }
    if let Some(count) = args.count {
        config.count = Some(count);
    }
    if let Some(unit) = &args.unit {
        config.unit = Some(unit.clone());
    }
    if let Some(devices) = &args.devices {
        config.devices = Some(
            devices
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        );
    }
    if let Some(binary) = &args.iostat_binary {
        config.iostat_binary = Some(binary.clone());
    }
    if let Some(timeout) = args.command_timeout {
        config.command_timeout = Some(timeout);
    }
    if let Some(basic) = &args.basic_report {
        config.basic_report_file = Some(basic.clone());
    }
    if let Some(extended) = &args.extended_report {
        config.extended_report_file = Some(extended.clone());
    }

    // TLS configuration: CLI wins if provided
    if args.enable_tls {
        config.enable_tls = Some(true);
    }
    if let Some(cert_path) = &args.tls_cert {
        config.tls_cert_path = Some(cert_path.to_string_lossy().to_string());
    }
    if let Some(key_path) = &args.tls_key {
        config.tls_key_path = Some(key_path.to_string_lossy().to_string());
    }

    Ok(config)
}

/// Configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let defaults = [
                "/etc/herakles/iostat-exporter.yaml",
                "/etc/herakles/iostat-exporter.yml",
                "/etc/herakles/iostat-exporter.json",
                "/etc/herakles/iostat-exporter.toml",
                "./herakles-iostat-exporter.yaml",
                "./herakles-iostat-exporter.yml",
                "./herakles-iostat-exporter.json",
                "./herakles-iostat-exporter.toml",
            ];

            match defaults.iter().map(Path::new).find(|p| p.exists()) {
                Some(p) => p.to_path_buf(),
                None => return Ok(Config::default()),
            }
        }
    };

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = parse_config(&content, path.extension().and_then(|s| s.to_str()))
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

/// Parses configuration text; the extension selects the format (YAML by default).
pub fn parse_config(
    content: &str,
    extension: Option<&str>,
) -> Result<Config, Box<dyn std::error::Error>> {
    let config = match extension {
        Some("json") => serde_json::from_str(content)?,
        Some("toml") => toml::from_str(content)?,
        _ => serde_yaml::from_str(content)?,
    };
    Ok(config)
}

/// Serializes configuration in the requested format
pub fn render_config(
    config: &Config,
    format: &ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut config = config.clone();
    config.unknown.clear();

    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(&config)?,
        ConfigFormat::Toml => toml::to_string_pretty(&config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(&config)?,
    })
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, &format)?);
    Ok(())
}
