//! Integration tests for one collection cycle.
//!
//! An in-memory runner serves canned report text so each failure mode of the
//! basic or extended invocation can be triggered on its own.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use herakles_iostat_exporter::{
    collect, CollectionError, CommandRunner, DeviceFilter, DeviceStatMap, InvocationError,
    MalformedReportError, ReportKind,
};

struct CannedRunner {
    basic: Result<&'static str, ()>,
    extended: Result<&'static str, ()>,
    calls: AtomicUsize,
}

impl CannedRunner {
    fn new(basic: Result<&'static str, ()>, extended: Result<&'static str, ()>) -> Self {
        Self {
            basic,
            extended,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CommandRunner for CannedRunner {
    async fn run(
        &self,
        report: ReportKind,
        _interval: Duration,
        _count: u32,
    ) -> Result<String, InvocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let canned = match report {
            ReportKind::Basic => self.basic,
            ReportKind::Extended => self.extended,
        };
        canned.map(str::to_string).map_err(|_| InvocationError::ExitStatus {
            binary: "iostat".into(),
            code: Some(1),
            stderr: format!("{} failed", report),
        })
    }
}

const BASIC: &str = "Device: tps Blk_read\nsda 1.0 100\nsdb 2.0 200\n";
const EXTENDED: &str = "Device: await %util\nsda 2.5 10.0\nsdc 3.0 1.0\n";

async fn run(
    runner: &CannedRunner,
    filter: &DeviceFilter,
) -> Result<DeviceStatMap, CollectionError> {
    collect(runner, filter, Duration::from_secs(1), 1).await
}

#[tokio::test]
async fn test_both_reports_are_merged() {
    let runner = CannedRunner::new(Ok(BASIC), Ok(EXTENDED));
    let stats = run(&runner, &DeviceFilter::all()).await.unwrap();

    assert_eq!(runner.calls.load(Ordering::SeqCst), 2);
    assert_eq!(stats.keys().collect::<Vec<_>>(), vec!["sda", "sdb"]);
    assert_eq!(stats["sda"].len(), 4);
    assert_eq!(stats["sdb"].len(), 2);
}

#[tokio::test]
async fn test_basic_invocation_failure() {
    let runner = CannedRunner::new(Err(()), Ok(EXTENDED));
    let err = run(&runner, &DeviceFilter::all()).await.unwrap_err();

    assert!(err.is_invocation());
    assert_eq!(err.report(), ReportKind::Basic);
    assert!(err.to_string().contains("basic"));
}

#[tokio::test]
async fn test_extended_invocation_failure() {
    let runner = CannedRunner::new(Ok(BASIC), Err(()));
    let err = run(&runner, &DeviceFilter::all()).await.unwrap_err();

    assert!(err.is_invocation());
    assert_eq!(err.report(), ReportKind::Extended);
    // both invocations still ran
    assert_eq!(runner.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_malformed_extended_report() {
    let runner = CannedRunner::new(Ok(BASIC), Ok("iostat: no devices\n"));
    let err = run(&runner, &DeviceFilter::all()).await.unwrap_err();

    match err {
        CollectionError::Malformed { report, source } => {
            assert_eq!(report, ReportKind::Extended);
            assert_eq!(source, MalformedReportError::MissingHeader);
        }
        other => panic!("expected Malformed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_numeric_value_fails_collection() {
    let runner = CannedRunner::new(Ok("Device: tps\nsda n/a\n"), Ok(EXTENDED));
    let err = run(&runner, &DeviceFilter::all()).await.unwrap_err();

    assert!(!err.is_invocation());
    assert_eq!(err.report(), ReportKind::Basic);
}

#[tokio::test]
async fn test_bad_value_on_filtered_device_is_ignored() {
    let runner = CannedRunner::new(Ok("Device: tps\nsda 1.0\nsdz n/a\n"), Ok(EXTENDED));
    let filter: DeviceFilter = ["sda"].into_iter().collect();
    let stats = run(&runner, &filter).await.unwrap();

    assert_eq!(stats["sda"]["tps"], 1.0);
    assert_eq!(stats["sda"]["await"], 2.5);
}

#[tokio::test]
async fn test_empty_tables_are_not_an_error() {
    let runner = CannedRunner::new(Ok("Device: tps\n"), Ok("Device: await\n"));
    let stats = run(&runner, &DeviceFilter::all()).await.unwrap();

    assert!(stats.is_empty());
}
