use std::fs;
use std::io::{self, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tempfile::NamedTempFile;

pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Replaces `path` with `bytes` in one rename. The temp file lives next to
/// the target so the rename never crosses filesystems.
pub fn write_atomic(path: &Path, bytes: &[u8], mode: u32) -> io::Result<()> {
    let parent = parent_dir(path);
    fs::create_dir_all(parent)?;
    let mut temp = NamedTempFile::new_in(parent)?;
    temp.as_file()
        .set_permissions(fs::Permissions::from_mode(mode))?;
    temp.write_all(bytes)?;
    temp.flush()?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// `<path>.<YYYYMMDD_HHMMSS>.bak`, with a counter appended when a backup
/// from the same second already exists.
pub fn backup_path_for(path: &Path, now: DateTime<Local>) -> PathBuf {
    let stamp = now.format(BACKUP_TIMESTAMP_FORMAT).to_string();
    let base = path.as_os_str().to_string_lossy().to_string();
    let mut candidate = PathBuf::from(format!("{}.{}.bak", base, stamp));
    let mut n = 1;
    while candidate.exists() {
        candidate = PathBuf::from(format!("{}.{}_{}.bak", base, stamp, n));
        n += 1;
    }
    candidate
}

/// Copies `path` aside before it is overwritten. Returns `None` when there is
/// nothing to preserve.
pub fn backup_file(path: &Path) -> io::Result<Option<PathBuf>> {
    if !path.is_file() {
        return Ok(None);
    }
    let target = backup_path_for(path, Local::now());
    fs::copy(path, &target)?;
    Ok(Some(target))
}

pub fn nearest_existing(path: &Path) -> PathBuf {
    let mut current = path.to_path_buf();
    loop {
        if current.exists() {
            return current;
        }
        match current.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => current = parent.to_path_buf(),
            _ => return PathBuf::from("."),
        }
    }
}
