//! iostat report collection.
//!
//! This module turns the columnar text printed by `iostat -d` and `iostat -x`
//! into per-device statistic maps and merges the two reports into a single
//! map per device.

pub mod merge;
pub mod parser;
pub mod runner;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

pub use merge::{collect, merge_reports};
pub use parser::parse_report;
pub use runner::{CapturedReports, CommandRunner, IostatCommand};

/// Statistic name to value for one device.
pub type StatMap = BTreeMap<String, f64>;

/// Device name to its statistics, as parsed from one report or merged
/// from both.
pub type DeviceStatMap = BTreeMap<String, StatMap>;

/// Which iostat report to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Device utilization report (`-d`).
    Basic,
    /// Extended statistics (`-x`).
    Extended,
}

impl ReportKind {
    /// Option flag passed to iostat for this report.
    pub fn flag(self) -> &'static str {
        match self {
            ReportKind::Basic => "-d",
            ReportKind::Extended => "-x",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Basic => f.write_str("basic"),
            ReportKind::Extended => f.write_str("extended"),
        }
    }
}

/// Allow-list of device names. An empty filter admits every device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceFilter {
    devices: BTreeSet<String>,
}

impl DeviceFilter {
    /// Filter that admits all devices.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn allows(&self, device: &str) -> bool {
        self.devices.is_empty() || self.devices.contains(device)
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn devices(&self) -> impl Iterator<Item = &str> {
        self.devices.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for DeviceFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            devices: iter
                .into_iter()
                .map(Into::into)
                .filter(|d: &String| !d.is_empty())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_allows_everything() {
        let filter = DeviceFilter::all();
        assert!(filter.is_empty());
        assert!(filter.allows("sda"));
        assert!(filter.allows("nvme0n1"));
    }

    #[test]
    fn test_filter_restricts_to_members() {
        let filter: DeviceFilter = ["sda", "dm-0"].into_iter().collect();
        assert!(filter.allows("sda"));
        assert!(filter.allows("dm-0"));
        assert!(!filter.allows("sdb"));
    }

    #[test]
    fn test_filter_ignores_empty_names() {
        let filter: DeviceFilter = vec![String::new()].into_iter().collect();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_report_flags() {
        assert_eq!(ReportKind::Basic.flag(), "-d");
        assert_eq!(ReportKind::Extended.flag(), "-x");
        assert_eq!(ReportKind::Extended.to_string(), "extended");
    }
}
