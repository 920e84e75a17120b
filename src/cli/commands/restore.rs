use tracing::info;

use crate::cli::args::RestoreArgs;
use crate::cli::commands::{ensure_required, Context};
use crate::error::Result;
use crate::restore::preflight::SystemProbe;
use crate::restore::{RestoreFlow, RestoreOutcome, RestoreSettings};
use crate::util::prompt::{Prompter, TerminalPrompter};

pub fn run_restore(ctx: &Context, args: RestoreArgs) -> Result<()> {
    let probe = SystemProbe;
    let mut prompter = TerminalPrompter;
    let record = ensure_required(&mut prompter, &ctx.config_path, ctx.load_record(), ctx.policy)?;
    let engine = ctx.engine_for(&record)?;
    prompter.say("Checking backup repository and snapshots...\n");

    let mut settings = RestoreSettings::new(ctx.program.clone(), ctx.elevation);
    settings.target = args.target;
    settings.dry_run = ctx.run_mode.dry_run;

    let mut flow = RestoreFlow::new(&engine, &probe, &mut prompter, settings);
    let (_, outcome) = flow.run(&ctx.config_path, record)?;
    match outcome {
        RestoreOutcome::Restored(id) => info!(snapshot = %id, "restore recorded"),
        RestoreOutcome::Cancelled => info!("restore cancelled by operator"),
    }
    Ok(())
}
