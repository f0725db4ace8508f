//! Merging of basic and extended iostat reports.

use std::time::Duration;

use tracing::{debug, instrument};

use super::parser::parse_report;
use super::runner::CommandRunner;
use super::{DeviceFilter, DeviceStatMap, ReportKind};
use crate::error::CollectionError;

/// Overlays extended statistics onto the basic statistics of each device.
///
/// Only devices present in `basic` survive. Extended values win when both
/// reports carry the same statistic name.
pub fn merge_reports(basic: DeviceStatMap, mut extended: DeviceStatMap) -> DeviceStatMap {
    let mut unified = basic;
    for (device, stats) in unified.iter_mut() {
        if let Some(extra) = extended.remove(device) {
            stats.extend(extra);
        }
    }

    if !extended.is_empty() {
        debug!(
            "Dropping {} device(s) only present in the extended report",
            extended.len()
        );
    }

    unified
}

/// Runs both reports and merges them into one map per device.
///
/// The two invocations are started together and both must finish before
/// anything is parsed. Any invocation or parse failure fails the whole
/// collection. An empty result is not an error.
#[instrument(skip(runner))]
pub async fn collect(
    runner: &dyn CommandRunner,
    filter: &DeviceFilter,
    interval: Duration,
    count: u32,
) -> Result<DeviceStatMap, CollectionError> {
    let (basic, extended) = tokio::join!(
        runner.run(ReportKind::Basic, interval, count),
        runner.run(ReportKind::Extended, interval, count),
    );

    let basic = parse(ReportKind::Basic, basic, filter)?;
    let extended = parse(ReportKind::Extended, extended, filter)?;

    debug!(
        "Parsed {} basic and {} extended device rows",
        basic.len(),
        extended.len()
    );

    Ok(merge_reports(basic, extended))
}

fn parse(
    report: ReportKind,
    output: Result<String, crate::error::InvocationError>,
    filter: &DeviceFilter,
) -> Result<DeviceStatMap, CollectionError> {
    let text = output.map_err(|source| CollectionError::Invocation { report, source })?;
    parse_report(&text, filter).map_err(|source| CollectionError::Malformed { report, source })
}
