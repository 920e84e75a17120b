use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{PreflightError, Result};
use crate::types::Elevation;
use crate::util::fs::nearest_existing;

/// Free space required on the restore volume.
pub const MIN_FREE_BYTES: u64 = 500 * 1024 * 1024;

pub trait HostProbe {
    fn find_program(&self, program: &str) -> Option<PathBuf>;
    /// `sudo` works without asking for a password.
    fn can_elevate(&self) -> bool;
    fn available_bytes(&self, path: &Path) -> std::result::Result<u64, PreflightError>;
}

pub struct SystemProbe;

impl HostProbe for SystemProbe {
    fn find_program(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }

    fn can_elevate(&self) -> bool {
        Command::new("sudo")
            .arg("-n")
            .arg("true")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn available_bytes(&self, path: &Path) -> std::result::Result<u64, PreflightError> {
        let existing = nearest_existing(path);
        let stat = nix::sys::statvfs::statvfs(existing.as_path()).map_err(|e| {
            PreflightError::Statfs {
                path: existing.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(stat.blocks_available() as u64 * stat.fragment_size() as u64)
    }
}

pub fn check_tools<H: HostProbe + ?Sized>(
    probe: &H,
    program: &str,
    elevation: Elevation,
) -> Result<()> {
    let found = probe
        .find_program(program)
        .ok_or_else(|| PreflightError::EngineMissing(program.to_string()))?;
    debug!(program, path = %found.display(), "engine found");
    if elevation == Elevation::Sudo && !probe.can_elevate() {
        return Err(PreflightError::NoElevation.into());
    }
    Ok(())
}

pub fn check_space<H: HostProbe + ?Sized>(probe: &H, target: &Path, required: u64) -> Result<u64> {
    let available = probe.available_bytes(target)?;
    debug!(target = %target.display(), available, required, "free space");
    if available < required {
        return Err(PreflightError::InsufficientSpace {
            path: target.to_path_buf(),
            available,
            required,
        }
        .into());
    }
    Ok(available)
}


#[cfg(test)]
mod tests {
    use super::testing::FakeProbe;
    use super::*;
    use crate::error::PersephoneError;

    #[test]
    fn missing_engine_fails() {
        let probe = FakeProbe {
            program_found: false,
            ..Default::default()
        };
        let err = check_tools(&probe, "restic", Elevation::None).unwrap_err();
        assert!(matches!(
            err,
            PersephoneError::Preflight(PreflightError::EngineMissing(_))
        ));
    }

    #[test]
    fn elevation_only_checked_when_used() {
        let probe = FakeProbe {
            can_elevate: false,
            ..Default::default()
        };
        assert!(check_tools(&probe, "restic", Elevation::None).is_ok());
        assert!(matches!(
            check_tools(&probe, "restic", Elevation::Sudo).unwrap_err(),
            PersephoneError::Preflight(PreflightError::NoElevation)
        ));
    }

    #[test]
    fn space_floor_is_enforced() {
        let probe = FakeProbe {
            available: 100 * 1024 * 1024,
            ..Default::default()
        };
        assert!(check_space(&probe, Path::new("/srv"), MIN_FREE_BYTES).is_err());
        let probe = FakeProbe {
            available: MIN_FREE_BYTES,
            ..Default::default()
        };
        assert_eq!(
            check_space(&probe, Path::new("/srv"), MIN_FREE_BYTES).unwrap(),
            MIN_FREE_BYTES
        );
    }

    #[test]
    fn system_probe_reads_real_filesystem() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let bytes = SystemProbe
            .available_bytes(&dir.path().join("not").join("yet"))
            .expect("statvfs");
        assert!(bytes > 0);
    }
}
