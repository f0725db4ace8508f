//! Command runners that produce raw iostat reports.
//!
//! `IostatCommand` invokes the iostat binary as
//! `<binary> -y <flag> [unit] <interval> <count>` and waits for it with a
//! bounded timeout. `CapturedReports` replays reports previously saved to
//! disk, which is how the exporter runs on hosts without sysstat and how the
//! collection path is exercised in tests.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::ReportKind;
use crate::error::InvocationError;

/// Default location of the sysstat iostat binary.
pub const DEFAULT_IOSTAT_BINARY: &str = "/usr/bin/iostat";

/// Produces the text of one iostat report.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Returns the captured standard output of one report invocation.
    async fn run(
        &self,
        report: ReportKind,
        interval: Duration,
        count: u32,
    ) -> Result<String, InvocationError>;
}

/// Runs the iostat binary as a subprocess.
#[derive(Debug, Clone)]
pub struct IostatCommand {
    binary: PathBuf,
    timeout: Duration,
    unit_flag: Option<&'static str>,
}

impl IostatCommand {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
            unit_flag: None,
        }
    }

    /// Adds a unit flag such as `-k` or `-m` to every invocation.
    pub fn with_unit_flag(mut self, flag: Option<&'static str>) -> Self {
        self.unit_flag = flag;
        self
    }

    pub fn binary(&self) -> &PathBuf {
        &self.binary
    }

    /// Arguments passed to the binary for one report.
    pub fn args(&self, report: ReportKind, interval: Duration, count: u32) -> Vec<String> {
        let mut args = vec!["-y".to_string(), report.flag().to_string()];
        if let Some(unit) = self.unit_flag {
            args.push(unit.to_string());
        }
        // iostat only accepts whole seconds.
        args.push(interval.as_secs().max(1).to_string());
        args.push(count.max(1).to_string());
        args
    }
}

#[async_trait]
impl CommandRunner for IostatCommand {
    #[instrument(skip(self), fields(binary = %self.binary.display()))]
    async fn run(
        &self,
        report: ReportKind,
        interval: Duration,
        count: u32,
    ) -> Result<String, InvocationError> {
        let args = self.args(report, interval, count);
        debug!("Running {} {}", self.binary.display(), args.join(" "));

        let child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| InvocationError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| InvocationError::Spawn {
                binary: self.binary.clone(),
                source,
            })?,
            Err(_) => {
                return Err(InvocationError::Timeout {
                    binary: self.binary.clone(),
                    timeout: self.timeout,
                })
            }
        };

        if !output.status.success() {
            return Err(InvocationError::ExitStatus {
                binary: self.binary.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(
            "{} report captured ({} bytes)",
            report,
            output.stdout.len()
        );
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Replays reports captured earlier with `iostat -y -d` and `iostat -y -x`.
#[derive(Debug, Clone)]
pub struct CapturedReports {
    basic: PathBuf,
    extended: PathBuf,
}

impl CapturedReports {
    pub fn new(basic: impl Into<PathBuf>, extended: impl Into<PathBuf>) -> Self {
        Self {
            basic: basic.into(),
            extended: extended.into(),
        }
    }

    fn path(&self, report: ReportKind) -> &PathBuf {
        match report {
            ReportKind::Basic => &self.basic,
            ReportKind::Extended => &self.extended,
        }
    }
}

#[async_trait]
impl CommandRunner for CapturedReports {
    async fn run(
        &self,
        report: ReportKind,
        _interval: Duration,
        _count: u32,
    ) -> Result<String, InvocationError> {
        let path = self.path(report);
        debug!("Reading captured {} report from {}", report, path.display());
        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| InvocationError::Read {
                path: path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_basic() {
        let cmd = IostatCommand::new(DEFAULT_IOSTAT_BINARY, Duration::from_secs(10));
        assert_eq!(
            cmd.args(ReportKind::Basic, Duration::from_secs(1), 1),
            vec!["-y", "-d", "1", "1"]
        );
    }

    #[test]
    fn test_args_extended_with_unit() {
        let cmd = IostatCommand::new(DEFAULT_IOSTAT_BINARY, Duration::from_secs(10))
            .with_unit_flag(Some("-k"));
        assert_eq!(
            cmd.args(ReportKind::Extended, Duration::from_secs(5), 3),
            vec!["-y", "-x", "-k", "5", "3"]
        );
    }

    #[test]
    fn test_args_clamp_to_one() {
        let cmd = IostatCommand::new(DEFAULT_IOSTAT_BINARY, Duration::from_secs(10));
        assert_eq!(
            cmd.args(ReportKind::Basic, Duration::from_millis(200), 0),
            vec!["-y", "-d", "1", "1"]
        );
    }
}
