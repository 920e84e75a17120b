use std::path::Path;

use crate::cli::commands::{passwd_file, repo_file, Context};
use crate::config::model::{
    ConfigRecord, PERS_PASSWD_FILE, PERS_PASSWD_FILE_VALUE, PERS_REPO_FILE, PERS_REPO_FILE_VALUE,
};
use crate::config::persist_config;
use crate::error::Result;
use crate::secrets::{locator_file, replace_secret};
use crate::util::prompt::{ask_twice, Prompter, TerminalPrompter};

pub fn run_update_repo(ctx: &Context) -> Result<()> {
    let mut prompter = TerminalPrompter;
    update_repo(&mut prompter, &ctx.config_path, ctx.load_record())?;
    Ok(())
}

pub fn run_update_password(ctx: &Context) -> Result<()> {
    let mut prompter = TerminalPrompter;
    update_password(&mut prompter, &ctx.config_path, ctx.load_record())?;
    Ok(())
}

pub fn update_repo<P: Prompter + ?Sized>(
    prompter: &mut P,
    config_path: &Path,
    mut record: ConfigRecord,
) -> Result<ConfigRecord> {
    let setting = repo_file(&record).to_string();
    let locator = match locator_file(&setting) {
        Some(path) => {
            prompter.say(&format!("Updating repository file at {}", path.display()));
            let locator = replace_secret(prompter, path, "repository URL", false)?;
            record.set(PERS_REPO_FILE, &setting);
            locator
        }
        None => {
            prompter.say(&format!("Replacing literal repository locator '{}'", setting));
            let locator = ask_twice(prompter, "Enter new repository URL", false)?;
            record.set(PERS_REPO_FILE, &locator);
            locator
        }
    };
    record.set(PERS_REPO_FILE_VALUE, locator);
    persist_config(config_path, &record)?;
    prompter.say("Configuration updated with new repository URL.");
    Ok(record)
}

/// The new password goes to its file only; any copy left in the config from
/// older setups is dropped.
pub fn update_password<P: Prompter + ?Sized>(
    prompter: &mut P,
    config_path: &Path,
    mut record: ConfigRecord,
) -> Result<ConfigRecord> {
    let path = passwd_file(&record);
    prompter.say(&format!("Updating password file at {}", path.display()));
    replace_secret(prompter, &path, "repository password", true)?;
    record.set(PERS_PASSWD_FILE, path.to_string_lossy());
    record.remove(PERS_PASSWD_FILE_VALUE);
    persist_config(config_path, &record)?;
    prompter.say("Configuration updated with new password.");
    Ok(record)
}
