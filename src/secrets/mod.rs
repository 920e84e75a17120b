//! File-backed single-line secrets: the repository locator and the
//! repository password.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Result, SecretError};
use crate::types::mask_preview;
use crate::util::fs::write_atomic;
use crate::util::host::{expand_hostname, hostname};
use crate::util::prompt::{ask, ask_twice, confirm, Prompter};

const SECRET_MODE: u32 = 0o600;

#[derive(Debug, Clone, Copy, Default)]
pub struct SecretPolicy {
    pub accept_empty_existing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretState {
    Confirmed,
    Written,
    /// A new value was entered but could not be stored.
    WriteFailed(String),
}

#[derive(Debug, Clone)]
pub struct Provisioned {
    pub value: String,
    pub state: SecretState,
}

fn clean(raw: &str) -> String {
    raw.trim().trim_matches(['"', '\'']).trim().to_string()
}

pub fn read_secret(path: &Path) -> std::result::Result<Option<String>, SecretError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(clean(&contents))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(SecretError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `value` followed by exactly one newline, owner-only.
pub fn write_secret(path: &Path, value: &str) -> std::result::Result<(), SecretError> {
    let data = format!("{}\n", value.trim_end_matches(['\r', '\n']));
    write_atomic(path, data.as_bytes(), SECRET_MODE).map_err(|source| SecretError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Shows the current content of a secret file and asks whether it is right.
/// A missing file, a rejected value, or (unless `policy` allows it) an empty
/// one leads to a fresh entry, which is then written back. A write failure is
/// reported in the result and does not abort the caller.
pub fn get_confirmed_value<P: Prompter + ?Sized>(
    prompter: &mut P,
    path: &Path,
    description: &str,
    masked: bool,
    policy: SecretPolicy,
) -> Result<Provisioned> {
    match read_secret(path) {
        Ok(Some(current)) => {
            let shown = if masked {
                mask_preview(&current)
            } else {
                current.clone()
            };
            prompter.say(&format!(
                "{} file found at '{}' with content:\n  {}",
                description,
                path.display(),
                shown
            ));
            if current.is_empty() && !policy.accept_empty_existing {
                prompter.say(&format!("{} file is empty; a value is required.", description));
            } else if confirm(
                prompter,
                &format!("Is this the correct value for {}? (Y/n): ", description),
                true,
            )? {
                debug!(path = %path.display(), "secret confirmed");
                return Ok(Provisioned {
                    value: current,
                    state: SecretState::Confirmed,
                });
            } else {
                prompter.say(&format!("Updating {} file...", description));
            }
        }
        Ok(None) => {
            prompter.say(&format!(
                "{} file not found at {}. It will be created.",
                description,
                path.display()
            ));
        }
        Err(err) => {
            warn!(error = %err, "secret unreadable");
            prompter.say(&format!("Error reading {} file: {}", description, err));
        }
    }

    let message = format!("Enter new literal value for {}", description);
    let value = if masked {
        ask_twice(prompter, &message, true)?
    } else {
        ask(prompter, &message, None, false)?
    };
    let state = match write_secret(path, &value) {
        Ok(()) => {
            prompter.say(&format!("Updated {} file at {}.", description, path.display()));
            SecretState::Written
        }
        Err(err) => {
            warn!(error = %err, "secret write failed");
            prompter.say(&format!("Error updating {} file: {}", description, err));
            SecretState::WriteFailed(err.to_string())
        }
    };
    Ok(Provisioned { value, state })
}

pub fn ensure_secret<P: Prompter + ?Sized>(
    prompter: &mut P,
    path: &Path,
    description: &str,
    masked: bool,
) -> Result<()> {
    if path.exists() {
        prompter.say(&format!("Found file: {}", path.display()));
        return Ok(());
    }
    prompter.say(&format!("File '{}' not found.", path.display()));
    let message = format!("Enter {}", description);
    let value = if masked {
        ask_twice(prompter, &message, true)?
    } else {
        ask(prompter, &message, None, false)?
    };
    write_secret(path, &value)?;
    prompter.say(&format!("Created file: {}", path.display()));
    Ok(())
}

/// Dual entry, then write. Unlike `get_confirmed_value` a write failure is an
/// error.
pub fn replace_secret<P: Prompter + ?Sized>(
    prompter: &mut P,
    path: &Path,
    description: &str,
    masked: bool,
) -> Result<String> {
    let value = ask_twice(prompter, &format!("Enter new {}", description), masked)?;
    write_secret(path, &value)?;
    prompter.say(&format!("Updated {} file at {}.", description, path.display()));
    Ok(value)
}

/// The repository setting names a locator file only when it is an absolute
/// path. Anything else is the locator itself.
pub fn locator_file(repo_file: &str) -> Option<&Path> {
    let path = Path::new(repo_file);
    path.is_absolute().then_some(path)
}

pub fn resolve_locator(repo_file: &str) -> Result<String> {
    match locator_file(repo_file) {
        Some(path) if path.is_file() => {
            let value = read_secret(path)?.unwrap_or_default();
            if value.is_empty() {
                return Err(SecretError::Empty(path.to_path_buf()).into());
            }
            Ok(value)
        }
        _ => Ok(expand_hostname(repo_file, &hostname())),
    }
}
