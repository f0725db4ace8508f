//! Startup requirement validation for herakles-iostat-exporter.
//!
//! This module validates that iostat can be run and that the kernel exposes
//! the block device statistics it reads before the exporter starts serving.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Kernel file iostat reads per-device counters from.
pub const DISKSTATS_PATH: &str = "/proc/diskstats";

/// Validate all runtime requirements
pub fn validate_requirements(iostat_binary: &Path) -> Result<(), ValidationError> {
    info!("🔍 Validating runtime requirements...");

    check_iostat_binary(iostat_binary)?;
    check_diskstats()?;

    info!("✅ All runtime requirements validated");
    Ok(())
}

/// Check that the iostat binary exists and is executable
pub fn check_iostat_binary(binary: &Path) -> Result<(), ValidationError> {
    let metadata = match fs::metadata(binary) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            error!("❌ {} not found", binary.display());
            error!("   Solution: install the sysstat package or set iostat_binary");
            return Err(ValidationError::IostatNotFound(binary.display().to_string()));
        }
        Err(e) => {
            return Err(ValidationError::IostatNotExecutable(format!(
                "{}: {}",
                binary.display(),
                e
            )));
        }
    };

    if !metadata.is_file() || metadata.permissions().mode() & 0o111 == 0 {
        error!("❌ {} is not an executable file", binary.display());
        return Err(ValidationError::IostatNotExecutable(
            binary.display().to_string(),
        ));
    }

    info!("✅ iostat binary found: {}", binary.display());
    Ok(())
}

/// Check that /proc/diskstats is readable
fn check_diskstats() -> Result<(), ValidationError> {
    match fs::read_to_string(DISKSTATS_PATH) {
        Ok(content) => {
            let devices = content.lines().filter(|l| !l.trim().is_empty()).count();
            if devices == 0 {
                warn!("⚠️  {} lists no block devices", DISKSTATS_PATH);
            } else {
                debug!("{} lists {} block devices", DISKSTATS_PATH, devices);
            }
            info!("✅ {} readable", DISKSTATS_PATH);
            Ok(())
        }
        Err(e) => {
            error!("❌ Cannot read {}: {}", DISKSTATS_PATH, e);
            Err(ValidationError::DiskstatsUnavailable(e.to_string()))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("iostat binary not found: {0}")]
    IostatNotFound(String),

    #[error("iostat binary not executable: {0}")]
    IostatNotExecutable(String),

    #[error("{DISKSTATS_PATH} not readable: {0}")]
    DiskstatsUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary() {
        let err = check_iostat_binary(Path::new("/nonexistent/iostat")).unwrap_err();
        assert!(matches!(err, ValidationError::IostatNotFound(_)));
    }

    #[test]
    fn test_non_executable_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::set_permissions(file.path(), fs::Permissions::from_mode(0o644)).unwrap();
        let err = check_iostat_binary(file.path()).unwrap_err();
        assert!(matches!(err, ValidationError::IostatNotExecutable(_)));
    }

    #[test]
    fn test_directory_is_not_executable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_iostat_binary(dir.path()).is_err());
    }
}
