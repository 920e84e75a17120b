pub mod check;
pub mod configure;
pub mod init;
pub mod inspect;
pub mod restore;
pub mod snapshots;
pub mod update;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::fields::Field;
use crate::config::model::{
    ConfigRecord, DEFAULT_PASSWD_FILE, DEFAULT_REPO_FILE, PERS_PASSWD_FILE, PERS_REPO_FILE,
};
use crate::config::{load_config, persist_config};
use crate::engine::command::{Credentials, EngineSpec};
use crate::engine::ResticEngine;
use crate::error::{
    CatalogError, ConfigError, PersephoneError, PromptError, Result, SecretError,
};
use crate::secrets::{ensure_secret, locator_file, read_secret, resolve_locator, SecretPolicy};
use crate::types::{Elevation, RunMode};
use crate::util::prompt::{ask, Prompter};

#[derive(Debug, Clone)]
pub struct Context {
    pub config_path: PathBuf,
    pub program: String,
    pub elevation: Elevation,
    pub policy: SecretPolicy,
    pub run_mode: RunMode,
}

impl Context {
    pub fn load_record(&self) -> ConfigRecord {
        load_config(&self.config_path)
    }

    pub fn engine_for(&self, record: &ConfigRecord) -> Result<ResticEngine> {
        let spec = engine_spec(&self.program, self.elevation, record)?;
        Ok(ResticEngine::new(spec, self.run_mode))
    }
}

pub fn repo_file(record: &ConfigRecord) -> &str {
    record.get_or(PERS_REPO_FILE, DEFAULT_REPO_FILE)
}

pub fn passwd_file(record: &ConfigRecord) -> PathBuf {
    PathBuf::from(record.get_or(PERS_PASSWD_FILE, DEFAULT_PASSWD_FILE))
}

pub fn engine_spec(program: &str, elevation: Elevation, record: &ConfigRecord) -> Result<EngineSpec> {
    let locator = resolve_locator(repo_file(record))?;
    debug!(%locator, "repository locator");
    Ok(EngineSpec {
        program: program.to_string(),
        repository: locator,
        password_file: passwd_file(record),
        credentials: Credentials::from_record(record),
        elevation,
    })
}

/// Makes sure the repository and password files a listing needs are in
/// place. Missing paths are asked for and persisted; missing files are
/// created. An empty password file is refused unless `policy` allows it.
pub fn ensure_required<P: Prompter + ?Sized>(
    prompter: &mut P,
    config_path: &Path,
    mut record: ConfigRecord,
    policy: SecretPolicy,
) -> Result<ConfigRecord> {
    let mut changed = false;
    for field in [Field::RepoFile, Field::PasswdFile] {
        if record.get(field.key()).is_none() {
            let value = ask(prompter, field.prompt(), field.default_value(), false)?;
            changed |= record.set(field.key(), value);
        }
    }
    if changed {
        persist_config(config_path, &record)?;
    }

    if let Some(repo_path) = locator_file(repo_file(&record)) {
        if !repo_path.exists() {
            ensure_secret(prompter, repo_path, "repository", false)?;
        }
    }

    let passwd = passwd_file(&record);
    ensure_secret(prompter, &passwd, "repository password", true)?;
    let password = read_secret(&passwd)?.unwrap_or_default();
    if password.is_empty() && !policy.accept_empty_existing {
        return Err(SecretError::Empty(passwd).into());
    }
    Ok(record)
}

pub fn exit_code(err: &PersephoneError) -> i32 {
    match err {
        PersephoneError::Preflight(_) => 10,
        PersephoneError::Catalog(CatalogError::Parse { .. }) => 11,
        PersephoneError::Catalog(CatalogError::Empty) => 12,
        PersephoneError::Engine(_) => 13,
        PersephoneError::Config(ConfigError::Write { .. })
        | PersephoneError::Secret(SecretError::Write { .. }) => 14,
        PersephoneError::Prompt(PromptError::Closed) => 15,
        _ => 2,
    }
}

pub fn exit_for_error(err: &PersephoneError) -> ! {
    println!("Error: {}", err);
    std::process::exit(exit_code(err));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::prompt::testing::ScriptedPrompter;
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    #[test]
    fn exit_codes_follow_error_kind() {
        assert_eq!(exit_code(&CatalogError::Empty.into()), 12);
        assert_eq!(
            exit_code(
                &CatalogError::Parse {
                    reason: "eof".into(),
                    raw: String::new()
                }
                .into()
            ),
            11
        );
        assert_eq!(exit_code(&PromptError::Closed.into()), 15);
        assert_eq!(
            exit_code(
                &ConfigError::Write {
                    path: PathBuf::from("/x"),
                    source: io::Error::from(io::ErrorKind::PermissionDenied),
                }
                .into()
            ),
            14
        );
        assert_eq!(exit_code(&PersephoneError::message("boom")), 2);
    }

    #[test]
    fn engine_spec_reads_repository_file() {
        let dir = TempDir::new().expect("tempdir");
        let repo = dir.path().join("repo");
        fs::write(&repo, "s3:s3.amazonaws.com/bucket\n").unwrap();
        let mut record = ConfigRecord::new();
        record.set(PERS_REPO_FILE, repo.to_string_lossy());
        record.set(PERS_PASSWD_FILE, "/etc/pw");
        let spec = engine_spec("restic", Elevation::None, &record).unwrap();
        assert_eq!(spec.repository, "s3:s3.amazonaws.com/bucket");
        assert_eq!(spec.password_file, PathBuf::from("/etc/pw"));
    }

    #[test]
    fn ensure_required_creates_missing_files() {
        let dir = TempDir::new().expect("tempdir");
        let config = dir.path().join("c.conf");
        let repo = dir.path().join("repo");
        let passwd = dir.path().join("passwd");
        let repo_s = repo.to_string_lossy().to_string();
        let passwd_s = passwd.to_string_lossy().to_string();
        let mut p = ScriptedPrompter::new(&[
            repo_s.as_str(),
            passwd_s.as_str(),
            "s3:host/bucket",
            "pw",
            "pw",
        ]);
        let record =
            ensure_required(&mut p, &config, ConfigRecord::new(), SecretPolicy::default()).unwrap();
        assert_eq!(record.get(PERS_REPO_FILE), Some(repo_s.as_str()));
        assert_eq!(fs::read_to_string(&repo).unwrap(), "s3:host/bucket\n");
        assert_eq!(fs::read_to_string(&passwd).unwrap(), "pw\n");
        assert_eq!(load_config(&config).get(PERS_PASSWD_FILE), Some(passwd_s.as_str()));
    }

    #[test]
    fn empty_password_file_is_refused_by_default() {
        let dir = TempDir::new().expect("tempdir");
        let config = dir.path().join("c.conf");
        let passwd = dir.path().join("passwd");
        fs::write(&passwd, "\n").unwrap();
        let mut record = ConfigRecord::new();
        record.set(PERS_REPO_FILE, "s3:host/bucket");
        record.set(PERS_PASSWD_FILE, passwd.to_string_lossy());

        let mut p = ScriptedPrompter::new(&[]);
        let err = ensure_required(&mut p, &config, record.clone(), SecretPolicy::default())
            .unwrap_err();
        assert!(matches!(err, PersephoneError::Secret(SecretError::Empty(_))));

        let lenient = SecretPolicy {
            accept_empty_existing: true,
        };
        assert!(ensure_required(&mut p, &config, record, lenient).is_ok());
        assert!(!config.exists());
    }
}
