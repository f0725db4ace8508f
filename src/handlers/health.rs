//! Health check endpoint handler.
//!
//! This module provides the `/health` endpoint handler that returns
//! exporter health statistics and the state of the last collection cycle.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::{debug, instrument};

use crate::state::SharedState;

// Time conversion constants
const SECONDS_PER_HOUR: f64 = 3600.0;
const MINUTES_PER_HOUR: f64 = 60.0;
const HOURS_PER_DAY: f64 = 24.0;

/// Footer text for human-readable HTTP endpoints.
pub const FOOTER_TEXT: &str = "Project: https://github.com/cansp-dev/herakles-iostat-exporter - More info: https://www.herakles.now - Support: exporter@herakles.now";

/// Handler for the /health endpoint.
#[instrument(skip(state))]
pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /health request");
    state.health_stats.record_http_request();

    let cache = state.cache.read().await;

    // A cycle that has never run is not a failure yet.
    let healthy = cache.update_success || cache.last_updated.is_none();
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let message = match (&cache.last_error, cache.last_updated, cache.is_updating) {
        (_, _, true) => "OK - Collection running".to_string(),
        (_, None, false) => "OK - No collection yet".to_string(),
        (Some(err), Some(_), false) => format!("Collection failed: {err}"),
        (None, Some(_), false) => "OK".to_string(),
    };

    let uptime_hours = state.health_stats.get_uptime_seconds() as f64 / SECONDS_PER_HOUR;
    let uptime_str = if uptime_hours < 1.0 {
        format!("{:.1} minutes", uptime_hours * MINUTES_PER_HOUR)
    } else if uptime_hours < HOURS_PER_DAY {
        format!("{:.1} hours", uptime_hours)
    } else {
        format!("{:.1} days", uptime_hours / HOURS_PER_DAY)
    };

    let table = state.health_stats.render_table();

    debug!("Health check: {} - {}", status, message);
    (
        status,
        [("Content-Type", "text/plain; charset=utf-8")],
        format!("{message}\n\nUptime: {uptime_str}\n\n{table}\n{FOOTER_TEXT}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::metrics::IostatMetrics;
    use crate::state::AppState;
    use axum::extract::State;
    use prometheus::Registry;

    fn state() -> SharedState {
        let config = Config {
            host: Some("test-host".into()),
            ..Config::default()
        };
        let registry = Registry::new();
        let metrics = IostatMetrics::new(&registry).unwrap();
        AppState::new(config, registry, metrics)
    }

    #[tokio::test]
    async fn test_healthy_before_first_collection() {
        let state = state();
        let response = health_handler(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unhealthy_after_failed_collection() {
        let state = state();
        {
            let mut cache = state.cache.write().await;
            cache.last_updated = Some(std::time::Instant::now());
            cache.update_success = false;
            cache.last_error = Some("basic report invocation failed".into());
        }
        let response = health_handler(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
