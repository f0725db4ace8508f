//! Herakles iostat Exporter Library
//!
//! Collects per-device disk statistics from the sysstat `iostat` utility and
//! prepares them for a monitoring backend.
//!
//! # Features
//!
//! - **Report parsing**: Reads the last `Device:` table of an iostat report,
//!   whatever columns the running kernel provides
//! - **Report merging**: Combines basic (`-d`) and extended (`-x`) reports into
//!   one statistic map per device
//! - **Device filtering**: Optional allow-list applied while parsing
//! - **Dispatch mapping**: Fixed table of canonical metric names and kinds
//!
//! # Usage
//!
//! ```rust
//! use herakles_iostat_exporter::iostat::{parse_report, merge_reports, DeviceFilter};
//!
//! let basic = "Device: tps Blk_read/s\nsda 1.5 20.0\n";
//! let extended = "Device: r/s w/s %util\nsda 0.5 1.0 3.2\n";
//!
//! let filter = DeviceFilter::all();
//! let unified = merge_reports(
//!     parse_report(basic, &filter).unwrap(),
//!     parse_report(extended, &filter).unwrap(),
//! );
//!
//! assert_eq!(unified["sda"]["tps"], 1.5);
//! assert_eq!(unified["sda"]["%util"], 3.2);
//! ```

pub mod dispatch;
pub mod error;
pub mod health_stats;
pub mod iostat;

// Re-export main types for convenience
pub use dispatch::{dispatch_stats, Dispatch, DispatchSummary, MetricKind, MetricSpec, ValueList};
pub use error::{CollectionError, InvocationError, MalformedReportError};
pub use health_stats::HealthStats;
pub use iostat::{
    collect, merge_reports, parse_report, CapturedReports, CommandRunner, DeviceFilter,
    DeviceStatMap, IostatCommand, ReportKind, StatMap,
};
