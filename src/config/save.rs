use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::model::ConfigRecord;
use crate::error::{ConfigError, Result};
use crate::util::fs::{backup_file, write_atomic};

const CONFIG_MODE: u32 = 0o600;

pub fn render_config(record: &ConfigRecord) -> Result<String> {
    let mut out = String::new();
    for (key, value) in record.iter() {
        if value.contains(['\n', '\r']) {
            return Err(ConfigError::Invalid(format!("value for {} contains a line break", key)).into());
        }
        out.push_str(&format!("{}=\"{}\"\n", key, value));
    }
    Ok(out)
}

/// Rewrites the whole file in one atomic rename.
pub fn save_config(path: &Path, record: &ConfigRecord) -> Result<()> {
    let data = render_config(record)?;
    write_atomic(path, data.as_bytes(), CONFIG_MODE).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Backs up the current file, then saves. A failed backup is logged and does
/// not stop the save; a failed save is an error.
pub fn persist_config(path: &Path, record: &ConfigRecord) -> Result<Option<PathBuf>> {
    let backup = match backup_file(path) {
        Ok(backup) => backup,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "config backup failed");
            None
        }
    };
    if let Some(backup) = &backup {
        info!(backup = %backup.display(), "config backed up");
    }
    save_config(path, record)?;
    Ok(backup)
}
