use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::engine::command::DEFAULT_ENGINE;

#[derive(Parser, Debug)]
#[command(
    name = "persephone",
    version,
    about = "Provision and restore restic-backed machine backups"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Settings file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Backup engine program.
    #[arg(long, global = true, default_value = DEFAULT_ENGINE)]
    pub engine: String,
    /// Run the engine directly instead of through `sudo -n`.
    #[arg(long, global = true)]
    pub no_sudo: bool,
    /// Accept an existing but empty secret file.
    #[arg(long, global = true)]
    pub allow_empty_secrets: bool,
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
    /// Print effectful engine commands instead of running them.
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Walk through every setting and secret file.
    Configure,
    /// Set up and initialize the repository, optionally back up right away.
    Init,
    UpdateRepo,
    UpdatePassword,
    /// Verify the repository answers with the stored credentials.
    Check,
    Snapshots,
    /// Look for persephone files on this machine.
    Inspect(InspectArgs),
    /// Pick a snapshot and restore it (default).
    Restore(RestoreArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RestoreArgs {
    /// Directory to restore into. Asked for when omitted.
    #[arg(long)]
    pub target: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct InspectArgs {
    pub roots: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn globals_work_after_subcommand() {
        let cli = Cli::try_parse_from([
            "persephone",
            "restore",
            "--target",
            "/srv/out",
            "--no-sudo",
            "--config",
            "/etc/p.conf",
        ])
        .unwrap();
        assert!(cli.no_sudo);
        assert_eq!(cli.engine, "restic");
        assert_eq!(cli.config, Some(PathBuf::from("/etc/p.conf")));
        match cli.command {
            Some(Command::Restore(args)) => {
                assert_eq!(args.target, Some(PathBuf::from("/srv/out")))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["persephone"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn kebab_case_subcommands() {
        let cli = Cli::try_parse_from(["persephone", "update-password"]).unwrap();
        assert!(matches!(cli.command, Some(Command::UpdatePassword)));
        let cli = Cli::try_parse_from(["persephone", "inspect", "/a", "/b"]).unwrap();
        match cli.command {
            Some(Command::Inspect(args)) => assert_eq!(args.roots.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }
}
