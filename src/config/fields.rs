use crate::config::model::{
    AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, BACKUP_PATHS_STR, DEFAULT_BACKUP_PATHS,
    DEFAULT_PASSWD_FILE, DEFAULT_REPO_FILE, PERS_PASSWD_FILE, PERS_PASSWD_FILE_VALUE,
    PERS_REPO_FILE, PERS_REPO_FILE_VALUE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    RepoFile,
    PasswdFile,
    BackupPaths,
    AwsAccessKeyId,
    AwsSecretAccessKey,
    RepoFileValue,
    PasswdFileValue,
}

impl Field {
    /// Processing order. Path fields come before the secret files they name.
    pub const ALL: [Field; 7] = [
        Field::RepoFile,
        Field::PasswdFile,
        Field::BackupPaths,
        Field::AwsAccessKeyId,
        Field::AwsSecretAccessKey,
        Field::RepoFileValue,
        Field::PasswdFileValue,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Field::RepoFile => PERS_REPO_FILE,
            Field::PasswdFile => PERS_PASSWD_FILE,
            Field::BackupPaths => BACKUP_PATHS_STR,
            Field::AwsAccessKeyId => AWS_ACCESS_KEY_ID,
            Field::AwsSecretAccessKey => AWS_SECRET_ACCESS_KEY,
            Field::RepoFileValue => PERS_REPO_FILE_VALUE,
            Field::PasswdFileValue => PERS_PASSWD_FILE_VALUE,
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Field::RepoFile => "Enter the repository file path",
            Field::PasswdFile => "Enter the password file path",
            Field::BackupPaths => "Enter backup paths (space-separated)",
            Field::AwsAccessKeyId => "Enter AWS Access Key",
            Field::AwsSecretAccessKey => "Enter AWS Secret Key",
            Field::RepoFileValue => "repository",
            Field::PasswdFileValue => "repository password",
        }
    }

    pub fn default_value(self) -> Option<&'static str> {
        match self {
            Field::RepoFile => Some(DEFAULT_REPO_FILE),
            Field::PasswdFile => Some(DEFAULT_PASSWD_FILE),
            Field::BackupPaths => Some(DEFAULT_BACKUP_PATHS),
            _ => None,
        }
    }

    pub fn masked(self) -> bool {
        matches!(self, Field::AwsSecretAccessKey | Field::PasswdFileValue)
    }

    pub fn confirm(self) -> bool {
        matches!(self, Field::AwsSecretAccessKey | Field::PasswdFileValue)
    }

    /// For values that live in a secret file: the field holding that file's path.
    pub fn backing_file(self) -> Option<Field> {
        match self {
            Field::RepoFileValue => Some(Field::RepoFile),
            Field::PasswdFileValue => Some(Field::PasswdFile),
            _ => None,
        }
    }

    /// Whether the value is mirrored into the config record. The repository
    /// password only ever lives in its secret file.
    pub fn cached_in_config(self) -> bool {
        !matches!(self, Field::PasswdFileValue)
    }

    pub fn optional(self) -> bool {
        matches!(self, Field::AwsAccessKeyId | Field::AwsSecretAccessKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backing_files_precede_their_values() {
        for (idx, field) in Field::ALL.iter().enumerate() {
            if let Some(path_field) = field.backing_file() {
                let path_idx = Field::ALL.iter().position(|f| *f == path_field).unwrap();
                assert!(path_idx < idx, "{:?} must come after {:?}", field, path_field);
                assert!(path_field.backing_file().is_none());
            }
        }
    }

    #[test]
    fn masked_fields_are_confirmed() {
        for field in Field::ALL {
            if field.masked() {
                assert!(field.confirm());
            }
        }
        assert!(!Field::PasswdFileValue.cached_in_config());
    }
}
