pub mod preflight;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::model::{ConfigRecord, LAST_RESTORED};
use crate::config::save::persist_config;
use crate::engine::Engine;
use crate::error::Result;
use crate::restore::preflight::{check_space, check_tools, HostProbe, MIN_FREE_BYTES};
use crate::snapshot::{list_snapshots, Snapshot, SnapshotCatalog};
use crate::types::{Elevation, SnapshotId};
use crate::util::prompt::{ask, confirm, Prompter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreStage {
    Idle,
    Listing,
    Displaying,
    Selecting,
    Confirming,
    Restoring,
    Recorded,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored(SnapshotId),
    Cancelled,
}

/// A confirmed snapshot and where it goes. Only built after the operator
/// said yes.
#[derive(Debug, Clone)]
pub struct RestoreIntent {
    pub snapshot: Snapshot,
    pub target: PathBuf,
}

#[derive(Debug, Clone)]
pub struct RestoreSettings {
    pub program: String,
    pub elevation: Elevation,
    /// Asked for interactively when unset. There is no default.
    pub target: Option<PathBuf>,
    pub min_free_bytes: u64,
    pub dry_run: bool,
}

impl RestoreSettings {
    pub fn new(program: impl Into<String>, elevation: Elevation) -> Self {
        Self {
            program: program.into(),
            elevation,
            target: None,
            min_free_bytes: MIN_FREE_BYTES,
            dry_run: false,
        }
    }
}

pub struct RestoreFlow<'a, E: Engine + ?Sized, H: HostProbe + ?Sized, P: Prompter + ?Sized> {
    engine: &'a E,
    probe: &'a H,
    prompter: &'a mut P,
    settings: RestoreSettings,
    stage: RestoreStage,
}

impl<'a, E, H, P> RestoreFlow<'a, E, H, P>
where
    E: Engine + ?Sized,
    H: HostProbe + ?Sized,
    P: Prompter + ?Sized,
{
    pub fn new(engine: &'a E, probe: &'a H, prompter: &'a mut P, settings: RestoreSettings) -> Self {
        Self {
            engine,
            probe,
            prompter,
            settings,
            stage: RestoreStage::Idle,
        }
    }

    pub fn stage(&self) -> RestoreStage {
        self.stage
    }

    fn enter(&mut self, stage: RestoreStage) {
        debug!(from = ?self.stage, to = ?stage, "restore stage");
        self.stage = stage;
    }

    fn cancel(&mut self, message: &str) -> RestoreOutcome {
        self.prompter.say(message);
        self.enter(RestoreStage::Cancelled);
        RestoreOutcome::Cancelled
    }

    /// Runs the whole restore. The record comes back updated with
    /// `LAST_RESTORED` (and already persisted to `config_path`) on success.
    pub fn run(
        &mut self,
        config_path: &Path,
        mut record: ConfigRecord,
    ) -> Result<(ConfigRecord, RestoreOutcome)> {
        check_tools(self.probe, &self.settings.program, self.settings.elevation)?;

        let Some(target) = self.resolve_target()? else {
            let outcome = self.cancel("Restore cancelled.");
            return Ok((record, outcome));
        };
        check_space(self.probe, &target, self.settings.min_free_bytes)?;

        self.enter(RestoreStage::Listing);
        let catalog = list_snapshots(self.engine)?;

        self.enter(RestoreStage::Displaying);
        self.display(&catalog);

        self.enter(RestoreStage::Selecting);
        let snapshot = self.select(&catalog)?.clone();

        self.enter(RestoreStage::Confirming);
        let question = format!(
            "Restore snapshot {} into {}? Existing files there will be overwritten. (y/N): ",
            snapshot.short_id,
            target.display()
        );
        if !confirm(self.prompter, &question, false)? {
            let outcome = self.cancel("Restore cancelled.");
            return Ok((record, outcome));
        }
        let intent = RestoreIntent { snapshot, target };

        self.enter(RestoreStage::Restoring);
        info!(snapshot = %intent.snapshot.short_id, target = %intent.target.display(), "restoring");
        self.engine
            .restore(&intent.snapshot.short_id, &intent.target)?;

        let id = SnapshotId::new(intent.snapshot.short_id.clone());
        if self.settings.dry_run {
            self.prompter
                .say(&format!("dry-run: {} not updated", LAST_RESTORED));
        } else {
            record.set(LAST_RESTORED, id.as_str());
            persist_config(config_path, &record)?;
        }
        self.enter(RestoreStage::Recorded);
        self.prompter.say(&format!(
            "Restoration of snapshot {} completed successfully.",
            id
        ));
        Ok((record, RestoreOutcome::Restored(id)))
    }

    /// `None` when the operator backs out of restoring into `/`.
    fn resolve_target(&mut self) -> Result<Option<PathBuf>> {
        let target = match self.settings.target.clone() {
            Some(target) => target,
            None => PathBuf::from(ask(
                self.prompter,
                "Enter restore target directory",
                None,
                false,
            )?),
        };
        if target == Path::new("/") {
            let question =
                "Restoring into / can overwrite system files. Restore into the filesystem root? (y/N): ";
            if !confirm(self.prompter, question, false)? {
                return Ok(None);
            }
        }
        Ok(Some(target))
    }

    fn display(&mut self, catalog: &SnapshotCatalog) {
        self.prompter.say("Available Snapshots:");
        self.prompter.say("--------------------");
        for line in catalog.render_lines() {
            self.prompter.say(&line);
        }
        self.prompter.say("");
    }

    fn select<'c>(&mut self, catalog: &'c SnapshotCatalog) -> Result<&'c Snapshot> {
        loop {
            let answer = self
                .prompter
                .read_line("Enter the number of the snapshot you want to restore: ")?;
            if let Ok(position) = answer.trim().parse::<usize>() {
                if let Some(snapshot) = catalog.get(position) {
                    self.prompter
                        .say(&format!("You have selected snapshot: {}", snapshot.short_id));
                    return Ok(snapshot);
                }
            }
            self.prompter.say(&format!(
                "Invalid selection. Please enter a number between 1 and {}.",
                catalog.len()
            ));
        }
    }
}
