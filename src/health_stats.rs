//! Health statistics for the exporter.
//!
//! Tracks how collection cycles perform (duration, devices, success rate and
//! the kind of failure) plus HTTP request activity, and renders them as the
//! plain-text table served on `/health`.

use std::collections::VecDeque;
use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock as StdRwLock};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use crate::error::CollectionError;

/// Running statistics for a single metric.
#[derive(Clone, Copy, Default)]
pub struct RunningStat {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    last: f64,
}

impl RunningStat {
    pub fn add(&mut self, value: f64) {
        if self.count == 0 {
            *self = RunningStat {
                count: 1,
                sum: value,
                min: value,
                max: value,
                last: value,
            };
            return;
        }
        self.count += 1;
        self.sum += value;
        self.last = value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / (self.count as f64)
        }
    }
}

/// Thread-safe wrapper for running statistics.
#[derive(Default)]
pub struct Stat {
    inner: Mutex<RunningStat>,
}

impl Stat {
    pub fn add_sample(&self, value: f64) {
        if let Ok(mut s) = self.inner.lock() {
            s.add(value);
        }
    }

    /// Returns (last, average, max, min, count).
    pub fn snapshot(&self) -> (f64, f64, f64, f64, u64) {
        if let Ok(s) = self.inner.lock() {
            (s.last, s.avg(), s.max, s.min, s.count)
        } else {
            (0.0, 0.0, 0.0, 0.0, 0)
        }
    }
}

/// Sliding window of HTTP request timestamps.
pub struct RequestTimestamps {
    inner: Mutex<VecDeque<Instant>>,
}

impl Default for RequestTimestamps {
    fn default() -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(256)),
        }
    }
}

impl RequestTimestamps {
    const WINDOW: Duration = Duration::from_secs(60);

    pub fn record(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            let now = Instant::now();
            guard.push_back(now);
            while guard
                .front()
                .is_some_and(|&t| now.duration_since(t) > Self::WINDOW)
            {
                guard.pop_front();
            }
        }
    }

    pub fn count_last_minute(&self) -> u64 {
        if let Ok(guard) = self.inner.lock() {
            guard
                .iter()
                .filter(|t| t.elapsed() <= Self::WINDOW)
                .count() as u64
        } else {
            0
        }
    }
}

/// Collection and HTTP statistics for the exporter.
pub struct HealthStats {
    pub collection_duration_seconds: Stat,
    pub devices_collected: Stat,
    pub values_dispatched: Stat,
    pub total_collections: AtomicU64,
    pub collection_success_count: AtomicU64,
    pub collection_failure_count: AtomicU64,

    // Failure breakdown
    pub invocation_errors: AtomicU64,
    pub parse_errors: AtomicU64,
    pub dispatch_errors: AtomicU64,
    pub unrecognized_statistics: AtomicU64,

    pub http_request_timestamps: RequestTimestamps,
    pub metrics_endpoint_calls: AtomicU64,

    pub start_time: Instant,
    pub last_collection_time: StdRwLock<Option<DateTime<Local>>>,
}

impl Default for HealthStats {
    fn default() -> Self {
        Self {
            collection_duration_seconds: Stat::default(),
            devices_collected: Stat::default(),
            values_dispatched: Stat::default(),
            total_collections: AtomicU64::new(0),
            collection_success_count: AtomicU64::new(0),
            collection_failure_count: AtomicU64::new(0),
            invocation_errors: AtomicU64::new(0),
            parse_errors: AtomicU64::new(0),
            dispatch_errors: AtomicU64::new(0),
            unrecognized_statistics: AtomicU64::new(0),
            http_request_timestamps: RequestTimestamps::default(),
            metrics_endpoint_calls: AtomicU64::new(0),
            start_time: Instant::now(),
            last_collection_time: StdRwLock::new(None),
        }
    }
}

impl HealthStats {
    pub fn new() -> Self {
        Default::default()
    }

    /// Records a completed collection cycle, successful or not.
    pub fn record_collection(&self, duration_seconds: f64) {
        self.collection_duration_seconds.add_sample(duration_seconds);
        self.total_collections.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut guard) = self.last_collection_time.write() {
            *guard = Some(Local::now());
        }
    }

    pub fn record_collection_success(&self, devices: u64, dispatched: u64, unrecognized: u64) {
        self.collection_success_count.fetch_add(1, Ordering::Relaxed);
        self.devices_collected.add_sample(devices as f64);
        self.values_dispatched.add_sample(dispatched as f64);
        self.unrecognized_statistics
            .fetch_add(unrecognized, Ordering::Relaxed);
    }

    pub fn record_collection_failure(&self, err: &CollectionError) {
        self.collection_failure_count.fetch_add(1, Ordering::Relaxed);
        if err.is_invocation() {
            self.invocation_errors.fetch_add(1, Ordering::Relaxed);
        } else {
            self.parse_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_dispatch_failure(&self) {
        self.collection_failure_count.fetch_add(1, Ordering::Relaxed);
        self.dispatch_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_http_request(&self) {
        self.http_request_timestamps.record();
    }

    pub fn record_metrics_endpoint_call(&self) {
        self.metrics_endpoint_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_collection_success_rate(&self) -> f64 {
        let success = self.collection_success_count.load(Ordering::Relaxed);
        let failure = self.collection_failure_count.load(Ordering::Relaxed);
        let total = success + failure;
        if total == 0 {
            100.0
        } else {
            (success as f64 / total as f64) * 100.0
        }
    }

    pub fn get_uptime_hours(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() / 3600.0
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn get_last_collection_time_str(&self) -> String {
        match self.last_collection_time.read() {
            Ok(guard) => guard
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            Err(_) => "N/A".to_string(),
        }
    }

    pub fn render_table(&self) -> String {
        let mut out = String::new();

        writeln!(out, "HEALTH ENDPOINT - EXPORTER INTERNAL STATS").ok();
        writeln!(out, "==========================================").ok();
        writeln!(out).ok();
        write_row(&mut out, "", "current", "average", "max", "min");

        writeln!(out).ok();
        writeln!(out, "COLLECTION").ok();
        writeln!(out, "----------").ok();
        write_stat(&mut out, "collection_duration (s)", &self.collection_duration_seconds, 3);
        write_stat(&mut out, "devices_collected", &self.devices_collected, 0);
        write_stat(&mut out, "values_dispatched", &self.values_dispatched, 0);
        let rate = format!("{:.1}", self.get_collection_success_rate());
        write_row(&mut out, "collection_success_rate (%)", &rate, &rate, &rate, &rate);
        write_counter(&mut out, "total_collections", &self.total_collections);

        writeln!(out).ok();
        writeln!(out, "ERRORS").ok();
        writeln!(out, "------").ok();
        write_counter(&mut out, "invocation_errors", &self.invocation_errors);
        write_counter(&mut out, "parse_errors", &self.parse_errors);
        write_counter(&mut out, "dispatch_errors", &self.dispatch_errors);
        write_counter(&mut out, "unrecognized_statistics", &self.unrecognized_statistics);

        writeln!(out).ok();
        writeln!(out, "HTTP SERVER").ok();
        writeln!(out, "-----------").ok();
        let last_minute = self.http_request_timestamps.count_last_minute().to_string();
        write_row(&mut out, "http_requests_last_minute", &last_minute, "N/A", "N/A", "N/A");
        write_counter(&mut out, "metrics_endpoint_calls", &self.metrics_endpoint_calls);

        writeln!(out).ok();
        writeln!(out, "uptime: {:.2} h", self.get_uptime_hours()).ok();
        writeln!(out, "last_collection: {}", self.get_last_collection_time_str()).ok();
        out
    }
}

const LEFT_COL: usize = 28;
const COL_W: usize = 12;

fn write_row(out: &mut String, label: &str, cur: &str, avg: &str, max: &str, min: &str) {
    writeln!(
        out,
        "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
        label,
        cur,
        avg,
        max,
        min,
        left = LEFT_COL,
        col = COL_W
    )
    .ok();
}

fn write_stat(out: &mut String, label: &str, stat: &Stat, precision: usize) {
    let (cur, avg, max, min, _) = stat.snapshot();
    write_row(
        out,
        label,
        &format!("{:.precision$}", cur),
        &format!("{:.precision$}", avg, precision = precision.max(1)),
        &format!("{:.precision$}", max),
        &format!("{:.precision$}", min),
    );
}

fn write_counter(out: &mut String, label: &str, counter: &AtomicU64) {
    let value = counter.load(Ordering::Relaxed).to_string();
    write_row(out, label, &value, "N/A", "N/A", "N/A");
}
