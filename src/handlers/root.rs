//! Root endpoint handler for the landing page.
//!
//! This module provides the `/` endpoint handler that displays
//! a landing page with all available endpoints and descriptions.

use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use tracing::{debug, instrument};

use crate::handlers::health::FOOTER_TEXT;
use crate::state::SharedState;

/// Handler for the root `/` endpoint.
#[instrument(skip(state))]
pub async fn root_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing / request");
    state.health_stats.record_http_request();

    let version = env!("CARGO_PKG_VERSION");
    let git_sha = option_env!("VERGEN_GIT_SHA").unwrap_or("unknown");

    let uptime_secs = state.start_time.elapsed().as_secs();
    let uptime_str = format!(
        "{}h {}m {}s",
        uptime_secs / 3600,
        (uptime_secs % 3600) / 60,
        uptime_secs % 60
    );

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Herakles iostat Exporter</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background: #f5f5f5; line-height: 1.6; }}
        .container {{ max-width: 900px; margin: 0 auto; background: white; padding: 40px; border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.1); }}
        h1 {{ color: #333; border-bottom: 3px solid #007bff; padding-bottom: 15px; }}
        .info {{ background: #e9ecef; padding: 15px; border-radius: 4px; display: flex; justify-content: space-around; flex-wrap: wrap; }}
        .info-label {{ font-weight: 600; color: #555; display: block; font-size: 0.9em; }}
        .info-value {{ font-size: 1.2em; color: #007bff; }}
        .endpoint-list {{ list-style: none; padding: 0; }}
        .endpoint-list li {{ margin: 20px 0; padding: 15px; background: #f8f9fa; border-left: 4px solid #007bff; border-radius: 4px; }}
        .endpoint-list a {{ color: #007bff; text-decoration: none; font-weight: 600; }}
        .endpoint-desc {{ color: #666; margin-top: 5px; }}
        .footer {{ margin-top: 40px; padding-top: 20px; border-top: 1px solid #ddd; color: #666; font-size: 0.9em; text-align: center; }}
    </style>
</head>
<body>
<div class="container">
    <h1>Herakles iostat Exporter</h1>
    <p>Per-device disk statistics from sysstat iostat (basic and extended reports)</p>

    <div class="info">
        <div><span class="info-label">Version</span><span class="info-value">{version} ({git_sha})</span></div>
        <div><span class="info-label">Host</span><span class="info-value">{host}</span></div>
        <div><span class="info-label">Uptime</span><span class="info-value">{uptime}</span></div>
    </div>

    <h2>Available Endpoints</h2>
    <ul class="endpoint-list">
        <li><a href="/metrics">/metrics</a><div class="endpoint-desc">Prometheus-compatible metrics endpoint</div></li>
        <li><a href="/stats">/stats</a><div class="endpoint-desc">Merged iostat statistics per device (JSON)</div></li>
        <li><a href="/health">/health</a><div class="endpoint-desc">Exporter collection statistics (text)</div></li>
        <li><a href="/config">/config</a><div class="endpoint-desc">Active runtime configuration (read-only)</div></li>
    </ul>

    <div class="footer"><p>{footer}</p></div>
</div>
</body>
</html>"#,
        version = version,
        git_sha = git_sha,
        host = state.host,
        uptime = uptime_str,
        footer = FOOTER_TEXT
    );

    Html(html)
}
