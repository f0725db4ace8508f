//! Integration tests for health stats module.
//!
//! These tests verify that HealthStats tracks collection cycles, classifies
//! failures and renders the /health table.

use herakles_iostat_exporter::health_stats::HealthStats;
use herakles_iostat_exporter::{CollectionError, InvocationError, MalformedReportError, ReportKind};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn invocation_failure() -> CollectionError {
    CollectionError::Invocation {
        report: ReportKind::Extended,
        source: InvocationError::Timeout {
            binary: "/usr/bin/iostat".into(),
            timeout: Duration::from_secs(10),
        },
    }
}

fn parse_failure() -> CollectionError {
    CollectionError::Malformed {
        report: ReportKind::Basic,
        source: MalformedReportError::MissingHeader,
    }
}

#[test]
fn test_health_stats_initialize_empty() {
    let stats = HealthStats::new();

    let (cur, avg, _, _, count) = stats.collection_duration_seconds.snapshot();
    assert_eq!(count, 0);
    assert_eq!(cur, 0.0);
    assert_eq!(avg, 0.0);

    assert_eq!(stats.total_collections.load(Ordering::Relaxed), 0);
    assert_eq!(stats.invocation_errors.load(Ordering::Relaxed), 0);
    assert_eq!(stats.parse_errors.load(Ordering::Relaxed), 0);
    assert_eq!(stats.get_collection_success_rate(), 100.0);
    assert_eq!(stats.get_last_collection_time_str(), "N/A");
}

#[test]
fn test_health_stats_recording_methods() {
    let stats = HealthStats::new();

    stats.record_collection(1.2);
    stats.record_collection_success(3, 40, 2);
    stats.record_collection(1.4);
    stats.record_collection_success(3, 42, 2);

    let (cur, avg, max, min, count) = stats.collection_duration_seconds.snapshot();
    assert_eq!(count, 2);
    assert_eq!(cur, 1.4);
    assert!((avg - 1.3).abs() < 1e-9);
    assert_eq!(max, 1.4);
    assert_eq!(min, 1.2);

    let (dispatched, _, _, _, _) = stats.values_dispatched.snapshot();
    assert_eq!(dispatched, 42.0);
    assert_eq!(stats.unrecognized_statistics.load(Ordering::Relaxed), 4);
    assert_eq!(stats.total_collections.load(Ordering::Relaxed), 2);
    assert_ne!(stats.get_last_collection_time_str(), "N/A");
}

#[test]
fn test_failures_are_classified() {
    let stats = HealthStats::new();

    stats.record_collection_failure(&invocation_failure());
    stats.record_collection_failure(&parse_failure());
    stats.record_collection_failure(&parse_failure());
    stats.record_dispatch_failure();

    assert_eq!(stats.invocation_errors.load(Ordering::Relaxed), 1);
    assert_eq!(stats.parse_errors.load(Ordering::Relaxed), 2);
    assert_eq!(stats.dispatch_errors.load(Ordering::Relaxed), 1);
    assert_eq!(stats.collection_failure_count.load(Ordering::Relaxed), 4);
}

#[test]
fn test_success_rate() {
    let stats = HealthStats::new();

    stats.record_collection_success(1, 1, 0);
    stats.record_collection_success(1, 1, 0);
    stats.record_collection_success(1, 1, 0);
    stats.record_collection_failure(&parse_failure());

    assert_eq!(stats.get_collection_success_rate(), 75.0);
}

#[test]
fn test_http_request_counting() {
    let stats = HealthStats::new();

    for _ in 0..5 {
        stats.record_http_request();
    }
    stats.record_metrics_endpoint_call();

    assert_eq!(stats.http_request_timestamps.count_last_minute(), 5);
    assert_eq!(stats.metrics_endpoint_calls.load(Ordering::Relaxed), 1);
}

#[test]
fn test_render_table_sections() {
    let stats = HealthStats::new();
    stats.record_collection(0.25);
    stats.record_collection_failure(&invocation_failure());

    let table = stats.render_table();

    assert!(table.contains("HEALTH ENDPOINT - EXPORTER INTERNAL STATS"));
    assert!(table.contains("COLLECTION"));
    assert!(table.contains("ERRORS"));
    assert!(table.contains("HTTP SERVER"));
    assert!(table.contains("invocation_errors"));
    assert!(table.contains("last_collection:"));
}

#[test]
fn test_concurrent_recording() {
    let stats = Arc::new(HealthStats::new());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let stats = Arc::clone(&stats);
            std::thread::spawn(move || {
                for _ in 0..100 {
                    stats.record_collection(0.01);
                    stats.record_collection_success(2, 10, 0);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(stats.total_collections.load(Ordering::Relaxed), 400);
    assert_eq!(stats.collection_success_count.load(Ordering::Relaxed), 400);
}
