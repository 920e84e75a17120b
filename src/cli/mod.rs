use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Cli, Command, RestoreArgs};
use crate::cli::commands::{
    check, configure, exit_for_error, init, inspect, restore, snapshots, update, Context,
};
use crate::config::model::DEFAULT_CONFIG_FILE;
use crate::secrets::SecretPolicy;
use crate::types::{Elevation, RunMode};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod args;
pub mod commands;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    print_banner();

    let ctx = Context {
        config_path: cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE)),
        program: cli.engine.clone(),
        elevation: Elevation::from_no_sudo(cli.no_sudo),
        policy: SecretPolicy {
            accept_empty_existing: cli.allow_empty_secrets,
        },
        run_mode: RunMode {
            dry_run: cli.dry_run,
            verbose: cli.verbose,
        },
    };
    tracing::debug!(config = %ctx.config_path.display(), elevation = ?ctx.elevation, "starting");

    let command = cli
        .command
        .clone()
        .unwrap_or_else(|| Command::Restore(RestoreArgs::default()));
    let result = match command {
        Command::Configure => configure::run_configure(&ctx),
        Command::Init => init::run_init(&ctx),
        Command::UpdateRepo => update::run_update_repo(&ctx),
        Command::UpdatePassword => update::run_update_password(&ctx),
        Command::Check => check::run_check(&ctx),
        Command::Snapshots => snapshots::run_snapshots(&ctx),
        Command::Inspect(args) => inspect::run_inspect(args),
        Command::Restore(args) => restore::run_restore(&ctx, args),
    };
    if let Err(err) = result {
        exit_for_error(&err);
    }
    Ok(())
}

fn print_banner() {
    println!("Persephone {}", VERSION);
}

/// Diagnostics go to stderr so they never interleave with prompts.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
