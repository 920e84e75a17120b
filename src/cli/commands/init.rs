use std::path::Path;

use chrono::{DateTime, Local};
use tracing::info;

use crate::cli::commands::check::missing_credentials;
use crate::cli::commands::configure::ask_field;
use crate::cli::commands::{passwd_file, Context};
use crate::config::fields::Field;
use crate::config::model::ConfigRecord;
use crate::config::persist_config;
use crate::engine::Engine;
use crate::error::Result;
use crate::secrets::ensure_secret;
use crate::util::fs::BACKUP_TIMESTAMP_FORMAT;
use crate::util::host::hostname;
use crate::util::prompt::{confirm, Prompter, TerminalPrompter};

pub fn run_init(ctx: &Context) -> Result<()> {
    let mut prompter = TerminalPrompter;
    let record = collect_settings(&mut prompter, &ctx.config_path, ctx.load_record())?;
    let engine = ctx.engine_for(&record)?;
    if missing_credentials(engine.spec()) {
        prompter.say("Warning: S3 repository without AWS credentials; the engine may fail.");
    }
    let tag = backup_tag(&hostname(), Local::now());
    bootstrap(&mut prompter, &engine, &record, &tag)
}

pub fn backup_tag(host: &str, now: DateTime<Local>) -> String {
    format!("{}-{}", host, now.format(BACKUP_TIMESTAMP_FORMAT))
}

/// Asks for paths and credentials, persists them, and makes sure the
/// password file exists.
pub fn collect_settings<P: Prompter + ?Sized>(
    prompter: &mut P,
    config_path: &Path,
    mut record: ConfigRecord,
) -> Result<ConfigRecord> {
    prompter.say("=== Repository Setup ===");
    for field in [Field::RepoFile, Field::PasswdFile, Field::BackupPaths] {
        let value = ask_field(prompter, field, &record)?;
        record.set(field.key(), value);
    }
    prompter.say("\n=== AWS Credentials ===");
    for field in [Field::AwsAccessKeyId, Field::AwsSecretAccessKey] {
        let value = ask_field(prompter, field, &record)?;
        record.set(field.key(), value);
    }
    persist_config(config_path, &record)?;

    ensure_secret(prompter, &passwd_file(&record), "repository password", true)?;
    Ok(record)
}

/// Initializes the repository when it does not answer yet, then offers a
/// first backup.
pub fn bootstrap<E: Engine + ?Sized, P: Prompter + ?Sized>(
    prompter: &mut P,
    engine: &E,
    record: &ConfigRecord,
    tag: &str,
) -> Result<()> {
    prompter.say("Checking if the repository is initialized...");
    if engine.is_initialized()? {
        prompter.say("Repository is already initialized.");
    } else {
        prompter.say("Repository not found or not initialized. Initializing repository...");
        engine.init()?;
        prompter.say("Repository initialized successfully.");
    }

    if !confirm(prompter, "\nDo you want to run the backup now? (Y/n): ", true)? {
        prompter.say("Backup not executed.");
        return Ok(());
    }
    let paths = record.backup_paths();
    info!(tag, paths = paths.len(), "starting backup");
    prompter.say("\nRunning backup...");
    engine.backup(&paths, Some(tag))?;
    prompter.say("Backup completed successfully.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use crate::config::model::{BACKUP_PATHS_STR, PERS_PASSWD_FILE, PERS_REPO_FILE};
    use crate::engine::testing::FakeEngine;
    use crate::util::prompt::testing::ScriptedPrompter;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn tag_is_host_and_timestamp() {
        let now = Local.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(backup_tag("web01", now), "web01-20250304_050607");
    }

    #[test]
    fn uninitialized_repository_gets_init_then_backup() {
        let engine = FakeEngine::default();
        let mut record = ConfigRecord::new();
        record.set(BACKUP_PATHS_STR, "/etc /srv");
        let mut p = ScriptedPrompter::new(&[""]);
        bootstrap(&mut p, &engine, &record, "web01-x").unwrap();
        assert_eq!(
            engine.calls(),
            vec!["snapshots", "init", "backup /etc /srv --tag web01-x"]
        );
    }

    #[test]
    fn initialized_repository_skips_init() {
        let engine = FakeEngine::with_listing("[]");
        let mut p = ScriptedPrompter::new(&["n"]);
        bootstrap(&mut p, &engine, &ConfigRecord::new(), "t").unwrap();
        assert_eq!(engine.calls(), vec!["snapshots"]);
        assert!(p.said_contains("already initialized"));
        assert!(p.said_contains("Backup not executed."));
    }

    #[test]
    fn failed_init_is_fatal() {
        let engine = FakeEngine {
            fail_effects: true,
            ..Default::default()
        };
        let mut p = ScriptedPrompter::new(&[""]);
        assert!(bootstrap(&mut p, &engine, &ConfigRecord::new(), "t").is_err());
        assert_eq!(engine.calls(), vec!["snapshots", "init"]);
        assert_eq!(p.remaining(), 1);
    }

    #[test]
    fn settings_are_persisted_and_password_created() {
        let dir = TempDir::new().expect("tempdir");
        let config = dir.path().join("c.conf");
        let passwd = dir.path().join("passwd");
        let passwd_s = passwd.to_string_lossy().to_string();
        let mut p = ScriptedPrompter::new(&[
            "s3:host/$(hostname)",
            passwd_s.as_str(),
            "/etc",
            "AKIA",
            "secret",
            "secret",
            "pw",
            "pw",
        ]);
        let record = collect_settings(&mut p, &config, ConfigRecord::new()).unwrap();
        assert_eq!(p.remaining(), 0);
        assert_eq!(load_config(&config), record);
        assert_eq!(record.get(PERS_REPO_FILE), Some("s3:host/$(hostname)"));
        assert_eq!(record.get(PERS_PASSWD_FILE), Some(passwd_s.as_str()));
        assert_eq!(fs::read_to_string(&passwd).unwrap(), "pw\n");
    }
}
