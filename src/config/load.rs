use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::model::{is_valid_key, ConfigRecord};

/// Loads the config file. A missing or unreadable file yields an empty record
/// and bad lines are skipped, so this never fails.
pub fn load_config(path: &Path) -> ConfigRecord {
    match fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found; starting empty");
            ConfigRecord::new()
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "config unreadable; starting empty");
            ConfigRecord::new()
        }
    }
}

pub fn parse_config(contents: &str) -> ConfigRecord {
    let mut record = ConfigRecord::new();
    for (lineno, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            debug!(line = lineno + 1, "skip config line without '='");
            continue;
        };
        let key = key.trim();
        if !is_valid_key(key) {
            debug!(line = lineno + 1, key, "skip config line with invalid key");
            continue;
        }
        record.set(key, strip_quotes(value.trim()));
    }
    record
}

/// Removes one layer of matching single or double quotes.
fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn missing_file_is_empty_record() {
        let dir = TempDir::new().expect("tempdir");
        let record = load_config(&dir.path().join("absent.conf"));
        assert!(record.is_empty());
    }

    #[test]
    fn parses_quoted_and_bare_values() {
        let mut file = NamedTempFile::new().expect("tempfile");
        let text = r#"
# persephone settings
PERS_REPO_FILE="/root/.persephone-repo"
PERS_PASSWD_FILE='/root/.persephone-passwd'
BACKUP_PATHS_STR = /etc /srv
this line is junk
1BAD="x"
AWS_ACCESS_KEY_ID=""
URL="s3:host/a=b"
"#;
        file.write_all(text.as_bytes()).expect("write");
        let record = load_config(file.path());
        assert_eq!(record.get("PERS_REPO_FILE"), Some("/root/.persephone-repo"));
        assert_eq!(record.get("PERS_PASSWD_FILE"), Some("/root/.persephone-passwd"));
        assert_eq!(record.get("BACKUP_PATHS_STR"), Some("/etc /srv"));
        assert_eq!(record.get("AWS_ACCESS_KEY_ID"), Some(""));
        assert_eq!(record.get("URL"), Some("s3:host/a=b"));
        assert_eq!(record.get("1BAD"), None);
        assert_eq!(record.len(), 5);
    }

    #[test]
    fn strips_only_one_layer() {
        assert_eq!(strip_quotes(r#""'inner'""#), "'inner'");
        assert_eq!(strip_quotes(r#"""#), r#"""#);
        assert_eq!(strip_quotes(r#""mismatched'"#), r#""mismatched'"#);
    }
}
