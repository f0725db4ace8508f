//! Statistics endpoint handler.
//!
//! This module provides the `/stats` endpoint handler that returns the merged
//! statistics of the last successful collection cycle as JSON.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use herakles_iostat_exporter::DeviceStatMap;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::cache_updater::refresh_if_stale;
use crate::state::SharedState;

#[derive(Serialize)]
struct StatsResponse<'a> {
    host: &'a str,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    collection_duration_seconds: f64,
    devices: DeviceStatMap,
}

/// Handler for the /stats endpoint.
#[instrument(skip(state))]
pub async fn stats_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /stats request");
    state.health_stats.record_http_request();

    refresh_if_stale(&state).await;

    let cache = state.cache.read().await;
    let status = if cache.update_success {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = StatsResponse {
        host: &state.host,
        success: cache.update_success,
        error: cache.last_error.clone(),
        collection_duration_seconds: cache.update_duration_seconds,
        devices: cache.stats.clone(),
    };

    (status, Json(body)).into_response()
}
