//! Configuration display endpoint handler.
//!
//! This module provides the `/config` endpoint handler that displays
//! the current exporter configuration.

use axum::{extract::State, response::IntoResponse};
use std::fmt::Write as FmtWrite;
use tracing::{debug, instrument};

use crate::config::{DEFAULT_BIND_ADDR, DEFAULT_PORT};
use crate::handlers::health::FOOTER_TEXT;
use crate::state::SharedState;

/// Handler for the /config endpoint.
#[instrument(skip(state))]
pub async fn config_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /config request");
    state.health_stats.record_http_request();

    let cfg = &state.config;
    let mut out = String::new();

    writeln!(out, "HERAKLES IOSTAT EXPORTER - CONFIGURATION").ok();
    writeln!(out, "========================================").ok();
    writeln!(out).ok();

    writeln!(out, "SERVER CONFIGURATION").ok();
    writeln!(out, "--------------------").ok();
    writeln!(out, "bind:              {}", cfg.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR)).ok();
    writeln!(out, "port:              {}", cfg.port.unwrap_or(DEFAULT_PORT)).ok();
    writeln!(out, "cache_ttl:         {} seconds", cfg.cache_ttl().as_secs()).ok();
    writeln!(out, "enable_health:     {}", cfg.enable_health.unwrap_or(true)).ok();
    writeln!(out, "enable_tls:        {}", cfg.enable_tls.unwrap_or(false)).ok();
    writeln!(out).ok();

    writeln!(out, "COLLECTION").ok();
    writeln!(out, "----------").ok();
    writeln!(out, "host:              {}", state.host).ok();
    writeln!(out, "verbose:           {}", cfg.verbose()).ok();
    writeln!(out, "interval:          {} seconds", cfg.interval().as_secs()).ok();
    writeln!(out, "count:             {}", cfg.count()).ok();
    writeln!(out, "unit:              {}", cfg.unit.as_deref().unwrap_or("blocks")).ok();
    if state.device_filter.is_empty() {
        writeln!(out, "devices:           (all)").ok();
    } else {
        let devices: Vec<&str> = state.device_filter.devices().collect();
        writeln!(out, "devices:           {}", devices.join(", ")).ok();
    }
    if cfg.uses_captured_reports() {
        let show = |p: &Option<std::path::PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        };
        writeln!(out, "basic_report:      {}", show(&cfg.basic_report_file)).ok();
        writeln!(out, "extended_report:   {}", show(&cfg.extended_report_file)).ok();
    } else {
        writeln!(out, "iostat_binary:     {}", cfg.iostat_binary().display()).ok();
        writeln!(out, "command_timeout:   {} seconds", cfg.command_timeout().as_secs()).ok();
    }
    writeln!(out).ok();
    writeln!(out, "{FOOTER_TEXT}").ok();

    ([("Content-Type", "text/plain; charset=utf-8")], out)
}
