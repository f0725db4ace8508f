//! Application state management for the exporter.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers and used by the collection cycle.

use herakles_iostat_exporter::{CommandRunner, DeviceFilter, HealthStats};
use prometheus::Registry;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::cache::MetricsCache;
use crate::config::Config;
use crate::metrics::IostatMetrics;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Global application state shared across requests.
pub struct AppState {
    pub registry: Registry,
    pub metrics: IostatMetrics,
    pub cache: Arc<RwLock<MetricsCache>>,
    pub config: Arc<Config>,
    /// Produces the basic and extended reports.
    pub runner: Arc<dyn CommandRunner>,
    pub device_filter: DeviceFilter,
    /// Host label resolved once at startup.
    pub host: String,
    pub health_stats: Arc<HealthStats>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        config: Config,
        registry: Registry,
        metrics: IostatMetrics,
    ) -> SharedState {
        let runner = config.command_runner();
        Self::with_runner(config, registry, metrics, runner)
    }

    /// Builds the state around an explicit report runner.
    pub fn with_runner(
        config: Config,
        registry: Registry,
        metrics: IostatMetrics,
        runner: Arc<dyn CommandRunner>,
    ) -> SharedState {
        Arc::new(Self {
            runner,
            device_filter: config.device_filter(),
            host: config.host(),
            config: Arc::new(config),
            registry,
            metrics,
            cache: Arc::new(RwLock::new(MetricsCache::default())),
            health_stats: Arc::new(HealthStats::new()),
            start_time: Instant::now(),
        })
    }
}
