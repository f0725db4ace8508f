//! Metrics endpoint handler for Prometheus scraping.
//!
//! This module provides the `/metrics` endpoint handler. A scrape runs a
//! collection cycle first when the cached statistics are older than
//! `cache_ttl`, then encodes the registry in Prometheus text format.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use prometheus::{Encoder, TextEncoder};
use std::time::Instant;
use tracing::{debug, error, instrument};

use crate::cache_updater::refresh_if_stale;
use crate::state::SharedState;

/// Buffer capacity for metrics encoding.
const BUFFER_CAP: usize = 64 * 1024;

/// Error type for metrics endpoint failures.
#[derive(Debug)]
pub enum MetricsError {
    EncodingFailed,
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to encode metrics",
        )
            .into_response()
    }
}

/// Handler for the /metrics endpoint.
#[instrument(skip(state))]
pub async fn metrics_handler(State(state): State<SharedState>) -> Result<String, MetricsError> {
    let start = Instant::now();
    debug!("Processing /metrics request");
    state.health_stats.record_http_request();
    state.health_stats.record_metrics_endpoint_call();

    refresh_if_stale(&state).await;

    let families = {
        let _cache = state.cache.read().await;
        state.registry.gather()
    };
    let mut buffer = Vec::with_capacity(BUFFER_CAP);
    if TextEncoder::new().encode(&families, &mut buffer).is_err() {
        error!("Failed to encode Prometheus metrics");
        return Err(MetricsError::EncodingFailed);
    }

    state
        .metrics
        .scrape_duration_seconds
        .set(start.elapsed().as_secs_f64());

    debug!(
        "Metrics request completed: {} bytes, {:.3}ms",
        buffer.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    String::from_utf8(buffer).map_err(|_| MetricsError::EncodingFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::metrics::IostatMetrics;
    use crate::state::AppState;
    use axum::extract::State;
    use prometheus::Registry;
    use std::time::Duration;

    #[tokio::test]
    async fn test_scrape_waits_for_publishing_cycle() {
        let config = Config {
            host: Some("test-host".into()),
            ..Config::default()
        };
        let registry = Registry::new();
        let metrics = IostatMetrics::new(&registry).unwrap();
        let state = AppState::new(config, registry, metrics);

        let publishing = state.cache.write().await;
        state
            .metrics
            .stat
            .with_label_values(&["test-host", "iostat", "sda", "gauge", "tps"])
            .set(2.0);

        let blocked = tokio::time::timeout(
            Duration::from_millis(50),
            metrics_handler(State(state.clone())),
        )
        .await;
        assert!(blocked.is_err());

        drop(publishing);
        state.cache.write().await.last_updated = Some(Instant::now());

        let body = metrics_handler(State(state.clone())).await.unwrap();
        assert!(body.contains(r#"plugin_instance="sda",type="gauge",type_instance="tps"} 2"#));
    }
}
