use std::path::Path;

use tracing::info;

use crate::cli::commands::Context;
use crate::config::fields::Field;
use crate::config::model::{ConfigRecord, DEFAULT_PASSWD_FILE, PERS_PASSWD_FILE};
use crate::config::persist_config;
use crate::error::Result;
use crate::secrets::{get_confirmed_value, locator_file, SecretPolicy, SecretState};
use crate::util::prompt::{ask, confirm, Prompter, TerminalPrompter};

pub fn run_configure(ctx: &Context) -> Result<()> {
    let record = ctx.load_record();
    let mut prompter = TerminalPrompter;
    configure(&mut prompter, &ctx.config_path, record, ctx.policy)?;
    Ok(())
}

/// Interactive provisioning of every field. The record is persisted once at
/// the end; secret files are written as each one is settled.
pub fn configure<P: Prompter + ?Sized>(
    prompter: &mut P,
    config_path: &Path,
    mut record: ConfigRecord,
    policy: SecretPolicy,
) -> Result<ConfigRecord> {
    let passwd_path = choose_passwd_file(prompter, &record)?;
    record.set(PERS_PASSWD_FILE, passwd_path);

    for field in Field::ALL {
        if field == Field::PasswdFile {
            continue;
        }
        match field.backing_file() {
            Some(file_field) => {
                let setting = record.get_or(file_field.key(), "").to_string();
                let path = match locator_file(&setting) {
                    Some(path) => path,
                    None if field == Field::RepoFileValue => {
                        prompter.say(&format!(
                            "Repository '{}' is used as a literal locator; no file is written.",
                            setting
                        ));
                        record.set(field.key(), &setting);
                        continue;
                    }
                    None => Path::new(&setting),
                };
                let provisioned =
                    get_confirmed_value(prompter, path, field.prompt(), field.masked(), policy)?;
                if let SecretState::WriteFailed(reason) = &provisioned.state {
                    info!(field = field.key(), %reason, "secret left unwritten");
                }
                if field.cached_in_config() {
                    record.set(field.key(), provisioned.value);
                } else {
                    record.remove(field.key());
                }
            }
            None => {
                let value = ask_field(prompter, field, &record)?;
                record.set(field.key(), value);
            }
        }
    }

    persist_config(config_path, &record)?;
    prompter.say(&format!("\nConfiguration saved to {}.", config_path.display()));
    prompter.say("Next steps:");
    prompter.say("- Run 'persephone init' to initialize the repository.");
    prompter.say("- Run 'persephone check' to verify the credentials.");
    Ok(record)
}

fn choose_passwd_file<P: Prompter + ?Sized>(
    prompter: &mut P,
    record: &ConfigRecord,
) -> Result<String> {
    let (which, current) = match record.get(PERS_PASSWD_FILE).filter(|v| !v.is_empty()) {
        Some(value) => ("existing", value),
        None => ("default", DEFAULT_PASSWD_FILE),
    };
    let question = format!(
        "Do you want to use the {} password file path ({})? (Y/n): ",
        which, current
    );
    if confirm(prompter, &question, true)? {
        return Ok(current.to_string());
    }
    ask(prompter, "Enter new password file path", Some(current), false)
}

/// Plain settings. The current value (or the built-in default) is offered;
/// optional fields may be left blank, confirmed fields are typed twice.
pub(crate) fn ask_field<P: Prompter + ?Sized>(
    prompter: &mut P,
    field: Field,
    record: &ConfigRecord,
) -> Result<String> {
    let current = record
        .get(field.key())
        .filter(|value| !value.is_empty())
        .or(field.default_value());
    if !field.optional() {
        return ask(prompter, field.prompt(), current, field.masked());
    }

    let prompt = match current {
        Some(value) if !field.masked() => format!("{} [{}]: ", field.prompt(), value),
        Some(_) => format!("{} [keep current]: ", field.prompt()),
        None => format!("{} (optional): ", field.prompt()),
    };
    loop {
        let first = read(prompter, &prompt, field.masked())?;
        if first.is_empty() {
            return Ok(current.unwrap_or_default().to_string());
        }
        if !field.confirm() {
            return Ok(first);
        }
        let second = read(prompter, "Confirm: ", field.masked())?;
        if first == second {
            return Ok(first);
        }
        prompter.say("Entries do not match. Try again.");
    }
}

fn read<P: Prompter + ?Sized>(prompter: &mut P, prompt: &str, masked: bool) -> Result<String> {
    let raw = if masked {
        prompter.read_secret(prompt)?
    } else {
        prompter.read_line(prompt)?
    };
    Ok(raw.trim().to_string())
}
