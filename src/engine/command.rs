use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::model::{ConfigRecord, AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY};
use crate::types::Elevation;

pub const DEFAULT_ENGINE: &str = "restic";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Credentials {
    pub fn from_record(record: &ConfigRecord) -> Self {
        Self {
            access_key_id: record.get(AWS_ACCESS_KEY_ID).unwrap_or_default().to_string(),
            secret_access_key: record
                .get(AWS_SECRET_ACCESS_KEY)
                .unwrap_or_default()
                .to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.access_key_id.is_empty() && !self.secret_access_key.is_empty()
    }

    pub fn vars(&self) -> Vec<(&'static str, &str)> {
        [
            (AWS_ACCESS_KEY_ID, self.access_key_id.as_str()),
            (AWS_SECRET_ACCESS_KEY, self.secret_access_key.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Subcommand<'a> {
    Init,
    Snapshots { json: bool },
    Backup {
        paths: &'a [String],
        tag: Option<&'a str>,
    },
    Restore {
        snapshot_id: &'a str,
        target: &'a Path,
    },
}

impl Subcommand<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Subcommand::Init => "init",
            Subcommand::Snapshots { .. } => "snapshots",
            Subcommand::Backup { .. } => "backup",
            Subcommand::Restore { .. } => "restore",
        }
    }

    pub fn args(&self) -> Vec<OsString> {
        let mut out: Vec<OsString> = vec![self.name().into()];
        match self {
            Subcommand::Init => {}
            Subcommand::Snapshots { json } => {
                if *json {
                    out.push("--json".into());
                }
            }
            Subcommand::Backup { paths, tag } => {
                out.extend(paths.iter().map(OsString::from));
                if let Some(tag) = tag {
                    out.push("--tag".into());
                    out.push((*tag).into());
                }
            }
            Subcommand::Restore {
                snapshot_id,
                target,
            } => {
                out.push((*snapshot_id).into());
                out.push("--target".into());
                out.push((*target).into());
            }
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct EngineSpec {
    pub program: String,
    pub repository: String,
    pub password_file: PathBuf,
    pub credentials: Credentials,
    pub elevation: Elevation,
}

/// Base environment followed by the credential variables. Inherited entries
/// with a credential's name are dropped so the explicit value wins.
pub fn merge_env<I>(base: I, credentials: &Credentials) -> Vec<(OsString, OsString)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let vars = credentials.vars();
    let mut env: Vec<(OsString, OsString)> = base
        .into_iter()
        .filter(|(key, _)| !vars.iter().any(|(name, _)| key == name))
        .collect();
    env.extend(
        vars.into_iter()
            .map(|(name, value)| (OsString::from(name), OsString::from(value))),
    );
    env
}

impl EngineSpec {
    pub fn command(&self, subcommand: &Subcommand<'_>) -> Command {
        let vars = self.credentials.vars();
        let mut cmd = match self.elevation {
            Elevation::Sudo => {
                let mut cmd = Command::new("sudo");
                cmd.arg("-n");
                if !vars.is_empty() {
                    let names: Vec<&str> = vars.iter().map(|(name, _)| *name).collect();
                    cmd.arg(format!("--preserve-env={}", names.join(",")));
                }
                cmd.arg(&self.program);
                cmd
            }
            Elevation::None => Command::new(&self.program),
        };
        cmd.arg("-r")
            .arg(&self.repository)
            .arg("--password-file")
            .arg(&self.password_file)
            .args(subcommand.args());
        cmd.env_clear()
            .envs(merge_env(std::env::vars_os(), &self.credentials));
        cmd
    }
}
