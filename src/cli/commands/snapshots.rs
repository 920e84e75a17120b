use crate::cli::commands::{ensure_required, Context};
use crate::engine::Engine;
use crate::error::Result;
use crate::snapshot::{list_snapshots, SnapshotCatalog};
use crate::util::prompt::{Prompter, TerminalPrompter};

pub fn run_snapshots(ctx: &Context) -> Result<()> {
    let mut prompter = TerminalPrompter;
    let record = ensure_required(&mut prompter, &ctx.config_path, ctx.load_record(), ctx.policy)?;
    let engine = ctx.engine_for(&record)?;
    show_snapshots(&mut prompter, &engine)?;
    Ok(())
}

pub fn show_snapshots<E: Engine + ?Sized, P: Prompter + ?Sized>(
    prompter: &mut P,
    engine: &E,
) -> Result<SnapshotCatalog> {
    let catalog = list_snapshots(engine)?;
    for line in catalog.render_lines() {
        prompter.say(&line);
    }
    prompter.say(&format!("{} snapshot(s)", catalog.len()));
    Ok(catalog)
}
