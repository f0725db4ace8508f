//! Parser for iostat device tables.
//!
//! iostat prints one table per sampling interval, each introduced by a header
//! line starting with `Device:`. Only the last table is used; earlier samples
//! are warm-up data. Columns vary by kernel and sysstat version, so statistic
//! names are taken from the header rather than from fixed positions.

use tracing::trace;

use super::{DeviceFilter, DeviceStatMap, StatMap};
use crate::error::MalformedReportError;

/// Token that opens every device table.
pub const HEADER_TOKEN: &str = "Device:";

/// Parses the last device table of `report` into per-device statistics.
///
/// Rows for devices not admitted by `filter` are skipped before their values
/// are parsed. Values are paired with header columns positionally and the
/// shorter of the two sequences wins, so short or long rows never fail. A
/// value that is not a number fails the whole report.
pub fn parse_report(
    report: &str,
    filter: &DeviceFilter,
) -> Result<DeviceStatMap, MalformedReportError> {
    let start = report
        .rfind(HEADER_TOKEN)
        .ok_or(MalformedReportError::MissingHeader)?;

    let mut lines = report[start..].lines();
    let columns: Vec<&str> = lines
        .next()
        .map(|header| header.split_whitespace().skip(1).collect())
        .unwrap_or_default();

    let mut stats = DeviceStatMap::new();

    for line in lines {
        let mut tokens = line.split_whitespace();
        let Some(device) = tokens.next() else {
            continue;
        };

        if !filter.allows(device) {
            trace!("Skipping device {} (not in device filter)", device);
            continue;
        }

        let mut row = StatMap::new();
        for (&statistic, token) in columns.iter().zip(tokens) {
            let value = token
                .parse::<f64>()
                .map_err(|_| MalformedReportError::InvalidValue {
                    device: device.to_string(),
                    statistic: statistic.to_string(),
                    token: token.to_string(),
                })?;
            row.insert(statistic.to_string(), value);
        }

        stats.insert(device.to_string(), row);
    }

    Ok(stats)
}
