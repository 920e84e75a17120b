use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersephoneError {
    #[error("{0}")]
    Message(String),
    #[error("{0}")]
    Config(ConfigError),
    #[error("{0}")]
    Secret(SecretError),
    #[error("{0}")]
    Engine(EngineError),
    #[error("{0}")]
    Catalog(CatalogError),
    #[error("{0}")]
    Preflight(PreflightError),
    #[error("{0}")]
    Prompt(PromptError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Invalid(String),
    #[error("write config {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("{0} is empty")]
    Empty(PathBuf),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{program}: {source}")]
    Spawn { program: String, source: io::Error },
    #[error("`{command}` failed with exit code {code}\n{output}")]
    Failed {
        command: String,
        code: i32,
        output: String,
    },
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("parse snapshot listing: {reason}\nengine output:\n{raw}")]
    Parse { reason: String, raw: String },
    #[error("no snapshots found")]
    Empty,
}

#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("{0} is not installed or not in PATH")]
    EngineMissing(String),
    #[error("sudo requires a password; run `sudo -v` first or use --no-sudo")]
    NoElevation,
    #[error("not enough free space on {path}: {available} bytes available, {required} required")]
    InsufficientSpace {
        path: PathBuf,
        available: u64,
        required: u64,
    },
    #[error("statfs {path}: {reason}")]
    Statfs { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("input closed")]
    Closed,
    #[error("terminal: {0}")]
    Terminal(io::Error),
}

pub type Result<T> = std::result::Result<T, PersephoneError>;

impl PersephoneError {
    pub fn message(msg: impl Into<String>) -> Self {
        PersephoneError::Message(msg.into())
    }
}

impl From<ConfigError> for PersephoneError {
    fn from(err: ConfigError) -> Self {
        PersephoneError::Config(err)
    }
}

impl From<SecretError> for PersephoneError {
    fn from(err: SecretError) -> Self {
        PersephoneError::Secret(err)
    }
}

impl From<EngineError> for PersephoneError {
    fn from(err: EngineError) -> Self {
        PersephoneError::Engine(err)
    }
}

impl From<CatalogError> for PersephoneError {
    fn from(err: CatalogError) -> Self {
        PersephoneError::Catalog(err)
    }
}

impl From<PreflightError> for PersephoneError {
    fn from(err: PreflightError) -> Self {
        PersephoneError::Preflight(err)
    }
}

impl From<PromptError> for PersephoneError {
    fn from(err: PromptError) -> Self {
        PersephoneError::Prompt(err)
    }
}
