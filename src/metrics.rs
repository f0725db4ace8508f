//! Prometheus metrics definitions for herakles-iostat-exporter.
//!
//! Every dispatched iostat value becomes one sample of `herakles_iostat_stat`,
//! labelled the way a collectd value list is identified. The remaining gauges
//! describe the exporter's own collection cycles.

use herakles_iostat_exporter::dispatch::{Dispatch, ValueList};
use herakles_iostat_exporter::error::DispatchError;
use prometheus::{Counter, Gauge, GaugeVec, Opts, Registry};

/// Label names of the per-device statistic gauge.
const STAT_LABELS: &[&str] = &["host", "plugin", "plugin_instance", "type", "type_instance"];

/// Collection of Prometheus metrics exposed by the exporter.
#[derive(Clone)]
pub struct IostatMetrics {
    /// labels: host, plugin, plugin_instance (device), type (kind), type_instance (metric)
    pub stat: GaugeVec,

    pub collection_duration_seconds: Gauge,
    pub collection_success: Gauge,
    pub collection_updating: Gauge,
    pub devices: Gauge,
    pub unrecognized_statistics_total: Counter,
    pub scrape_duration_seconds: Gauge,
}

impl IostatMetrics {
    /// Creates and registers all Prometheus metrics with the registry.
    pub fn new(registry: &Registry) -> Result<Self, Box<dyn std::error::Error>> {
        let stat = GaugeVec::new(
            Opts::new(
                "herakles_iostat_stat",
                "Per-device iostat statistic; type is gauge, counter or percent",
            ),
            STAT_LABELS,
        )?;
        let collection_duration_seconds = Gauge::new(
            "herakles_iostat_collection_duration_seconds",
            "Time spent running and parsing both iostat reports",
        )?;
        let collection_success = Gauge::new(
            "herakles_iostat_collection_success",
            "Whether the last collection cycle succeeded (1) or failed (0)",
        )?;
        let collection_updating = Gauge::new(
            "herakles_iostat_collection_updating",
            "Whether a collection cycle is currently running (1) or idle (0)",
        )?;
        let devices = Gauge::new(
            "herakles_iostat_devices",
            "Number of devices in the last successful collection",
        )?;
        let unrecognized_statistics_total = Counter::new(
            "herakles_iostat_unrecognized_statistics_total",
            "iostat columns dropped because they have no metric mapping",
        )?;
        let scrape_duration_seconds = Gauge::new(
            "herakles_iostat_scrape_duration_seconds",
            "Time spent serving the last /metrics request",
        )?;

        registry.register(Box::new(stat.clone()))?;
        registry.register(Box::new(collection_duration_seconds.clone()))?;
        registry.register(Box::new(collection_success.clone()))?;
        registry.register(Box::new(collection_updating.clone()))?;
        registry.register(Box::new(devices.clone()))?;
        registry.register(Box::new(unrecognized_statistics_total.clone()))?;
        registry.register(Box::new(scrape_duration_seconds.clone()))?;

        Ok(Self {
            stat,
            collection_duration_seconds,
            collection_success,
            collection_updating,
            devices,
            unrecognized_statistics_total,
            scrape_duration_seconds,
        })
    }

    /// Drops all per-device series so vanished devices disappear.
    pub fn reset_stats(&self) {
        self.stat.reset();
    }
}

impl Dispatch for IostatMetrics {
    fn dispatch(&self, value: &ValueList<'_>) -> Result<(), DispatchError> {
        self.stat
            .get_metric_with_label_values(&[
                value.host,
                value.plugin,
                value.plugin_instance,
                value.kind.as_str(),
                value.type_instance,
            ])
            .map_err(|e| e.to_string())?
            .set(value.value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herakles_iostat_exporter::dispatch::dispatch_stats;
    use herakles_iostat_exporter::DeviceStatMap;
    use prometheus::{Encoder, TextEncoder};

    #[test]
    fn test_dispatch_into_registry() {
        let registry = Registry::new();
        let metrics = IostatMetrics::new(&registry).unwrap();

        let mut stats = DeviceStatMap::new();
        stats.insert(
            "sda".into(),
            [("%util".to_string(), 12.5), ("Blk_read".to_string(), 1000.0)]
                .into_iter()
                .collect(),
        );
        let summary = dispatch_stats(&stats, "host01", false, &metrics).unwrap();
        assert_eq!(summary.dispatched, 2);

        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&registry.gather(), &mut buffer)
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains(
            r#"herakles_iostat_stat{host="host01",plugin="iostat",plugin_instance="sda",type="percent",type_instance="util"} 12.5"#
        ));
        assert!(text.contains(r#"type="counter",type_instance="blkread"} 1000"#));
    }

    #[test]
    fn test_reset_removes_series() {
        let registry = Registry::new();
        let metrics = IostatMetrics::new(&registry).unwrap();
        metrics
            .stat
            .with_label_values(&["h", "iostat", "sda", "gauge", "tps"])
            .set(1.0);
        metrics.reset_stats();

        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&registry.gather(), &mut buffer)
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(!text.contains("herakles_iostat_stat{"));
    }
}
