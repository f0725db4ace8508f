//! Error types for report collection.
//!
//! The taxonomy separates failures to obtain a report (`InvocationError`)
//! from failures to understand one (`MalformedReportError`). Both surface to
//! callers wrapped in a `CollectionError` that also names which report failed.

use std::path::PathBuf;
use std::time::Duration;

use crate::iostat::ReportKind;

/// The iostat command could not be launched or did not finish cleanly.
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    #[error("failed to launch {binary}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{binary} exited with {}: {stderr}", exit_code_str(.code))]
    ExitStatus {
        binary: PathBuf,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{binary} did not finish within {}s", .timeout.as_secs_f64())]
    Timeout { binary: PathBuf, timeout: Duration },

    #[error("failed to read captured report {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn exit_code_str(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// The report text did not contain a usable statistics table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedReportError {
    #[error("report does not contain a 'Device:' table header")]
    MissingHeader,

    #[error("device {device}: value {token:?} for {statistic} is not numeric")]
    InvalidValue {
        device: String,
        statistic: String,
        token: String,
    },
}

/// A collection cycle failed; no partial statistics are returned.
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("{report} report invocation failed: {source}")]
    Invocation {
        report: ReportKind,
        #[source]
        source: InvocationError,
    },

    #[error("{report} report is malformed: {source}")]
    Malformed {
        report: ReportKind,
        #[source]
        source: MalformedReportError,
    },
}

impl CollectionError {
    pub fn report(&self) -> ReportKind {
        match self {
            CollectionError::Invocation { report, .. } => *report,
            CollectionError::Malformed { report, .. } => *report,
        }
    }

    pub fn is_invocation(&self) -> bool {
        matches!(self, CollectionError::Invocation { .. })
    }
}

/// Error returned by a dispatch sink.
pub type DispatchError = Box<dyn std::error::Error + Send + Sync>;
