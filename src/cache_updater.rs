//! Collection cycle for the exporter.
//!
//! One cycle runs both iostat reports, merges them, dispatches the result into
//! the Prometheus registry and stores it in the cache. It is triggered on demand
//! by the HTTP handlers when the cached result is older than `cache_ttl`.

use herakles_iostat_exporter::{collect, dispatch_stats, CollectionError, DeviceStatMap, DispatchSummary};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::state::SharedState;

/// Failure of one collection cycle.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error(transparent)]
    Collection(#[from] CollectionError),

    #[error("dispatch failed: {0}")]
    Dispatch(String),
}

/// Runs a collection cycle unless the cache is fresh or a cycle is running.
///
/// The cycle runs in its own task, so a caller that is dropped mid-cycle
/// (a scrape timing out) does not cancel it and `is_updating` is always reset.
pub async fn refresh_if_stale(state: &SharedState) {
    let stale = state.cache.read().await.is_stale(state.config.cache_ttl());
    if !stale {
        debug!("Cache is fresh or being updated, serving cached statistics");
        return;
    }

    let task_state = Arc::clone(state);
    let cycle = tokio::spawn(async move { update_cache(&task_state).await });

    match cycle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Collection cycle failed: {}", e),
        Err(e) => error!("Collection task did not complete: {}", e),
    }
}

/// Runs one collection cycle and stores its result.
///
/// A failed cycle keeps the previously dispatched values, marks the cache as
/// failed and returns the error; nothing from the failed cycle is dispatched.
#[instrument(skip(state))]
pub async fn update_cache(state: &SharedState) -> Result<(), UpdateError> {
    {
        let mut cache = state.cache.write().await;
        if cache.is_updating {
            debug!("Collection already in progress, serving stale cache");
            return Ok(());
        }
        cache.is_updating = true;
        state.metrics.collection_updating.set(1.0);
    }

    if state.config.verbose() {
        info!("[verbose] Collection cycle started");
    } else {
        debug!("Collection cycle started");
    }

    let start = Instant::now();
    let result = collect(
        state.runner.as_ref(),
        &state.device_filter,
        state.config.interval(),
        state.config.count(),
    )
    .await;
    let duration = start.elapsed().as_secs_f64();

    state.health_stats.record_collection(duration);
    state.metrics.collection_duration_seconds.set(duration);

    // Dispatch happens under the write lock so a scrape never gathers a
    // half-published cycle.
    let mut cache = state.cache.write().await;

    let outcome = match result {
        Ok(stats) => publish(state, &stats).map(|summary| (stats, summary)),
        Err(e) => {
            state.health_stats.record_collection_failure(&e);
            Err(UpdateError::from(e))
        }
    };

    cache.is_updating = false;
    cache.last_updated = Some(Instant::now());
    cache.update_duration_seconds = duration;
    state.metrics.collection_updating.set(0.0);

    match outcome {
        Ok((stats, summary)) => {
            info!(
                "Collected {} device(s), dispatched {} value(s) in {:.3}s",
                stats.len(),
                summary.dispatched,
                duration
            );
            cache.stats = stats;
            cache.update_success = true;
            cache.last_error = None;
            state.metrics.collection_success.set(1.0);
            Ok(())
        }
        Err(e) => {
            cache.update_success = false;
            cache.last_error = Some(e.to_string());
            state.metrics.collection_success.set(0.0);
            Err(e)
        }
    }
}

/// Replaces the dispatched per-device values with `stats`.
fn publish(state: &SharedState, stats: &DeviceStatMap) -> Result<DispatchSummary, UpdateError> {
    if stats.is_empty() {
        warn!("No statistics received from iostat");
    }

    state.metrics.reset_stats();
    let summary = dispatch_stats(stats, &state.host, state.config.verbose(), &state.metrics)
        .map_err(|e| {
            state.health_stats.record_dispatch_failure();
            UpdateError::Dispatch(e.to_string())
        })?;

    state.metrics.devices.set(stats.len() as f64);
    state
        .metrics
        .unrecognized_statistics_total
        .inc_by(summary.unrecognized as f64);
    state.health_stats.record_collection_success(
        stats.len() as u64,
        summary.dispatched as u64,
        summary.unrecognized as u64,
    );

    Ok(summary)
}
