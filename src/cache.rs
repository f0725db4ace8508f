//! Cache of the last collection cycle.
//!
//! This module provides the `MetricsCache` structure holding the merged iostat
//! statistics between scrapes, along with metadata about the last cycle.

use herakles_iostat_exporter::DeviceStatMap;
use std::time::{Duration, Instant};

/// Cache state for the last collection cycle with update timing information.
#[derive(Clone, Default)]
pub struct MetricsCache {
    /// Merged statistics of the last successful cycle.
    pub stats: DeviceStatMap,
    pub last_updated: Option<Instant>,
    pub update_duration_seconds: f64,
    pub update_success: bool,
    pub is_updating: bool,
    pub last_error: Option<String>,
}

impl MetricsCache {
    /// Whether a new collection cycle should run.
    pub fn is_stale(&self, ttl: Duration) -> bool {
        !self.is_updating
            && self
                .last_updated
                .map(|t| t.elapsed() >= ttl)
                .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cache_is_stale() {
        assert!(MetricsCache::default().is_stale(Duration::from_secs(60)));
    }

    #[test]
    fn test_updating_cache_is_not_stale() {
        let cache = MetricsCache {
            is_updating: true,
            ..Default::default()
        };
        assert!(!cache.is_stale(Duration::ZERO));
    }

    #[test]
    fn test_fresh_cache_is_not_stale() {
        let cache = MetricsCache {
            last_updated: Some(Instant::now()),
            ..Default::default()
        };
        assert!(!cache.is_stale(Duration::from_secs(60)));
        assert!(cache.is_stale(Duration::ZERO));
    }
}
