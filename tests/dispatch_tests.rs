//! Integration tests for the statistic dispatch mapping.

use std::cell::RefCell;

use herakles_iostat_exporter::dispatch::{lookup, PLUGIN_NAME};
use herakles_iostat_exporter::error::DispatchError;
use herakles_iostat_exporter::{
    dispatch_stats, merge_reports, parse_report, Dispatch, DeviceFilter, MetricKind, ValueList,
};

#[derive(Default)]
struct Collected {
    lines: RefCell<Vec<String>>,
}

impl Dispatch for Collected {
    fn dispatch(&self, v: &ValueList<'_>) -> Result<(), DispatchError> {
        self.lines.borrow_mut().push(format!(
            "{}/{}-{}/{}-{}={}",
            v.host, v.plugin, v.plugin_instance, v.kind, v.type_instance, v.value
        ));
        Ok(())
    }
}

#[test]
fn test_every_documented_statistic_is_mapped() {
    use MetricKind::*;

    let expected = [
        ("wrqm/s", Gauge),
        ("await", Gauge),
        ("Blk_wrtn/s", Gauge),
        ("svctm", Gauge),
        ("Blk_wrtn", Counter),
        ("avgrq-sz", Gauge),
        ("r/s", Gauge),
        ("Blk_read", Counter),
        ("w/s", Gauge),
        ("avgqu-sz", Gauge),
        ("wsec/s", Gauge),
        ("tps", Gauge),
        ("rrqm/s", Gauge),
        ("Blk_read/s", Gauge),
        ("%util", Percent),
        ("rsec/s", Gauge),
        ("kB_read/s", Gauge),
        ("kB_wrtn/s", Gauge),
        ("kB_read", Gauge),
        ("kB_wrtn", Gauge),
        ("MB_read/s", Gauge),
        ("MB_wrtn/s", Gauge),
        ("MB_read", Gauge),
        ("MB_wrtn", Gauge),
    ];

    for (statistic, kind) in expected {
        let spec = lookup(statistic).unwrap_or_else(|| panic!("{} is not mapped", statistic));
        assert_eq!(spec.kind, kind, "wrong kind for {}", statistic);
    }
}

#[test]
fn test_newer_sysstat_columns_are_dropped() {
    for statistic in ["rkB/s", "wkB/s", "r_await", "w_await", "aqu-sz", "%rrqm", "d/s"] {
        assert!(lookup(statistic).is_none(), "{} should not be mapped", statistic);
    }
}

#[test]
fn test_report_to_dispatched_values() {
    let filter = DeviceFilter::all();
    let basic = parse_report(
        "Device: tps Blk_read/s Blk_wrtn/s Blk_read Blk_wrtn\nsda 1.23 4.56 7.89 1000 2000\n",
        &filter,
    )
    .unwrap();
    let extended = parse_report("Device: rkB/s %util\nsda 12.0 3.5\n", &filter).unwrap();

    let sink = Collected::default();
    let summary = dispatch_stats(&merge_reports(basic, extended), "db01", true, &sink).unwrap();

    assert_eq!(summary.dispatched, 6);
    assert_eq!(summary.unrecognized, 1);

    let lines = sink.lines.into_inner();
    assert!(lines.contains(&format!("db01/{}-sda/gauge-tps=1.23", PLUGIN_NAME)));
    assert!(lines.contains(&"db01/iostat-sda/counter-blkread=1000".to_string()));
    assert!(lines.contains(&"db01/iostat-sda/percent-util=3.5".to_string()));
    assert!(!lines.iter().any(|l| l.contains("rkB")));
}
