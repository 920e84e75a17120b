use crate::cli::commands::{ensure_required, Context};
use crate::engine::command::EngineSpec;
use crate::engine::Engine;
use crate::error::{PersephoneError, Result};
use crate::util::prompt::{Prompter, TerminalPrompter};

/// Object storage locators need both cloud credential fields.
pub fn missing_credentials(spec: &EngineSpec) -> bool {
    spec.repository.starts_with("s3:") && !spec.credentials.is_complete()
}

pub fn run_check(ctx: &Context) -> Result<()> {
    let mut prompter = TerminalPrompter;
    prompter.say("Checking Persephone credentials...");
    let record = ensure_required(&mut prompter, &ctx.config_path, ctx.load_record(), ctx.policy)?;
    let engine = ctx.engine_for(&record)?;
    if missing_credentials(engine.spec()) {
        return Err(PersephoneError::message(
            "S3 repository detected, but AWS credentials are missing",
        ));
    }
    check_access(&mut prompter, &engine)
}

pub fn check_access<E: Engine + ?Sized, P: Prompter + ?Sized>(
    prompter: &mut P,
    engine: &E,
) -> Result<()> {
    match engine.probe_access() {
        Ok(output) => {
            prompter.say("Credentials are valid. Repository is accessible.");
            prompter.say(&output);
            Ok(())
        }
        Err(err) => {
            prompter.say("Repository authentication failed!");
            Err(err)
        }
    }
}
