use std::collections::BTreeMap;

pub const DEFAULT_CONFIG_FILE: &str = ".persephone.conf";

pub const PERS_REPO_FILE: &str = "PERS_REPO_FILE";
pub const PERS_PASSWD_FILE: &str = "PERS_PASSWD_FILE";
pub const BACKUP_PATHS_STR: &str = "BACKUP_PATHS_STR";
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const PERS_REPO_FILE_VALUE: &str = "PERS_REPO_FILE_VALUE";
pub const PERS_PASSWD_FILE_VALUE: &str = "PERS_PASSWD_FILE_VALUE";
pub const LAST_RESTORED: &str = "LAST_RESTORED";

pub const DEFAULT_REPO_FILE: &str = "/root/.persephone-repo";
pub const DEFAULT_PASSWD_FILE: &str = "/root/.persephone-passwd";
pub const DEFAULT_BACKUP_PATHS: &str = "/root /home /var /etc /srv /usr /opt";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigRecord {
    values: BTreeMap<String, String>,
}

impl ConfigRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.get(key) {
            Some(value) if !value.is_empty() => value,
            _ => default,
        }
    }

    /// Returns whether the stored value changed.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.get(key) == Some(value.as_str()) {
            return false;
        }
        self.values.insert(key.to_string(), value);
        true
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Backup paths split on whitespace.
    pub fn backup_paths(&self) -> Vec<String> {
        self.get_or(BACKUP_PATHS_STR, DEFAULT_BACKUP_PATHS)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

pub fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
