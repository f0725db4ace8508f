//! Mapping of iostat statistics to monitoring values.
//!
//! Every recognized iostat column maps to a fixed canonical metric name and a
//! metric kind. The merged statistics are walked once per collection cycle and
//! each recognized value is handed to a [`Dispatch`] sink. Columns missing
//! from the table are dropped.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::{info, trace};

use crate::error::DispatchError;
use crate::iostat::DeviceStatMap;

/// Plugin name attached to every dispatched value.
pub const PLUGIN_NAME: &str = "iostat";

/// How the monitoring backend should interpret a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Gauge,
    Counter,
    Percent,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
            MetricKind::Percent => "percent",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical name and kind for one iostat statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricSpec {
    pub name: &'static str,
    pub kind: MetricKind,
}

const fn spec(name: &'static str, kind: MetricKind) -> MetricSpec {
    MetricSpec { name, kind }
}

/// Every iostat statistic that is forwarded, keyed by its column header.
pub const STAT_METRICS: &[(&str, MetricSpec)] = &[
    ("wrqm/s", spec("wrqms", MetricKind::Gauge)),
    ("await", spec("await", MetricKind::Gauge)),
    ("Blk_wrtn/s", spec("blkwrtns", MetricKind::Gauge)),
    ("svctm", spec("svctm", MetricKind::Gauge)),
    ("Blk_wrtn", spec("blkwrtn", MetricKind::Counter)),
    ("avgrq-sz", spec("avgrqsz", MetricKind::Gauge)),
    ("r/s", spec("rs", MetricKind::Gauge)),
    ("Blk_read", spec("blkread", MetricKind::Counter)),
    ("w/s", spec("ws", MetricKind::Gauge)),
    ("avgqu-sz", spec("avgqusz", MetricKind::Gauge)),
    ("wsec/s", spec("wsecs", MetricKind::Gauge)),
    ("tps", spec("tps", MetricKind::Gauge)),
    ("rrqm/s", spec("rrqms", MetricKind::Gauge)),
    ("Blk_read/s", spec("blkreads", MetricKind::Gauge)),
    ("%util", spec("util", MetricKind::Percent)),
    ("rsec/s", spec("rsecs", MetricKind::Gauge)),
    ("kB_read/s", spec("kBreads", MetricKind::Gauge)),
    ("kB_wrtn/s", spec("kBwrtns", MetricKind::Gauge)),
    ("kB_read", spec("kBread", MetricKind::Gauge)),
    ("kB_wrtn", spec("kBwrtn", MetricKind::Gauge)),
    ("MB_read/s", spec("MBreads", MetricKind::Gauge)),
    ("MB_wrtn/s", spec("MBwrtns", MetricKind::Gauge)),
    ("MB_read", spec("MBread", MetricKind::Gauge)),
    ("MB_wrtn", spec("MBwrtn", MetricKind::Gauge)),
];

static METRIC_TABLE: Lazy<HashMap<&'static str, MetricSpec>> =
    Lazy::new(|| STAT_METRICS.iter().copied().collect());

/// Looks up the canonical metric for an iostat column header.
pub fn lookup(statistic: &str) -> Option<MetricSpec> {
    METRIC_TABLE.get(statistic).copied()
}

/// One value ready for the monitoring backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueList<'a> {
    pub host: &'a str,
    pub plugin: &'static str,
    pub plugin_instance: &'a str,
    #[serde(rename = "type")]
    pub kind: MetricKind,
    pub type_instance: &'static str,
    pub value: f64,
}

/// Receives dispatched values.
pub trait Dispatch {
    fn dispatch(&self, value: &ValueList<'_>) -> Result<(), DispatchError>;
}

/// Outcome of one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub dispatched: usize,
    pub unrecognized: usize,
}

/// Forwards every recognized statistic in `stats` to `sink`.
///
/// Unrecognized statistics are counted and only logged when `verbose` is set.
/// The first sink error aborts the pass.
pub fn dispatch_stats(
    stats: &DeviceStatMap,
    host: &str,
    verbose: bool,
    sink: &dyn Dispatch,
) -> Result<DispatchSummary, DispatchError> {
    let mut summary = DispatchSummary::default();

    for (device, items) in stats {
        for (statistic, &value) in items {
            let Some(metric) = lookup(statistic) else {
                if verbose {
                    info!("[verbose] Unrecognized statistic {} on {}", statistic, device);
                } else {
                    trace!("Unrecognized statistic {} on {}", statistic, device);
                }
                summary.unrecognized += 1;
                continue;
            };

            sink.dispatch(&ValueList {
                host,
                plugin: PLUGIN_NAME,
                plugin_instance: device,
                kind: metric.kind,
                type_instance: metric.name,
                value,
            })?;
            summary.dispatched += 1;
        }
    }

    Ok(summary)
}
