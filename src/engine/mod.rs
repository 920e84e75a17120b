pub mod command;

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::engine::command::{EngineSpec, Subcommand};
use crate::error::{EngineError, Result};
use crate::types::RunMode;
use crate::util::command::{describe_command, maybe_print_command};

pub trait Engine {
    /// `false` when the repository does not answer; never an error for a
    /// non-zero exit.
    fn is_initialized(&self) -> Result<bool>;
    fn init(&self) -> Result<()>;
    fn backup(&self, paths: &[String], tag: Option<&str>) -> Result<()>;
    fn snapshots_json(&self) -> Result<Vec<u8>>;
    // plain listing; only used to prove the credentials work
    fn probe_access(&self) -> Result<String>;
    fn restore(&self, snapshot_id: &str, target: &Path) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Capture,
    Quiet,
    Stream,
}

#[derive(Debug, Clone)]
pub struct Invocation {
    pub command: String,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub code: i32,
}

impl Invocation {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    pub fn combined_output(&self) -> String {
        let mut out = String::from_utf8_lossy(&self.stdout).to_string();
        let err = String::from_utf8_lossy(&self.stderr);
        if !err.is_empty() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&err);
        }
        out
    }

    fn into_checked(self) -> Result<Self> {
        if self.success() {
            return Ok(self);
        }
        Err(EngineError::Failed {
            output: self.combined_output(),
            command: self.command,
            code: self.code,
        }
        .into())
    }
}

fn run(mut cmd: Command, mode: OutputMode) -> Result<Invocation> {
    let command = describe_command(&cmd);
    let program = cmd.get_program().to_string_lossy().to_string();
    debug!(%command, ?mode, "invoke engine");
    let spawn_err = |source| EngineError::Spawn {
        program: program.clone(),
        source,
    };
    cmd.stdin(Stdio::null());
    let invocation = match mode {
        OutputMode::Capture => {
            let output = cmd.output().map_err(spawn_err)?;
            Invocation {
                command,
                stdout: output.stdout,
                stderr: output.stderr,
                code: output.status.code().unwrap_or(1),
            }
        }
        OutputMode::Quiet => {
            let status = cmd
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map_err(spawn_err)?;
            Invocation {
                command,
                stdout: Vec::new(),
                stderr: Vec::new(),
                code: status.code().unwrap_or(1),
            }
        }
        OutputMode::Stream => {
            let status = cmd
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(spawn_err)?;
            Invocation {
                command,
                stdout: Vec::new(),
                stderr: Vec::new(),
                code: status.code().unwrap_or(1),
            }
        }
    };
    debug!(code = invocation.code, "engine exited");
    Ok(invocation)
}

pub struct ResticEngine {
    spec: EngineSpec,
    run_mode: RunMode,
}

impl ResticEngine {
    pub fn new(spec: EngineSpec, run_mode: RunMode) -> Self {
        Self { spec, run_mode }
    }

    pub fn spec(&self) -> &EngineSpec {
        &self.spec
    }

    pub fn invoke(&self, subcommand: &Subcommand<'_>, mode: OutputMode) -> Result<Invocation> {
        let cmd = self.spec.command(subcommand);
        maybe_print_command(&cmd, self.run_mode);
        run(cmd, mode)
    }

    /// Runs a command that changes state. Dry runs only print it.
    fn effect(&self, subcommand: &Subcommand<'_>) -> Result<()> {
        if self.run_mode.dry_run {
            let cmd = self.spec.command(subcommand);
            maybe_print_command(&cmd, self.run_mode);
            return Ok(());
        }
        info!(subcommand = subcommand.name(), "running engine");
        self.invoke(subcommand, OutputMode::Stream)?.into_checked()?;
        Ok(())
    }
}

impl Engine for ResticEngine {
    fn is_initialized(&self) -> Result<bool> {
        let invocation = self.invoke(&Subcommand::Snapshots { json: false }, OutputMode::Quiet)?;
        Ok(invocation.success())
    }

    fn init(&self) -> Result<()> {
        self.effect(&Subcommand::Init)
    }

    fn backup(&self, paths: &[String], tag: Option<&str>) -> Result<()> {
        self.effect(&Subcommand::Backup { paths, tag })
    }

    fn snapshots_json(&self) -> Result<Vec<u8>> {
        let invocation = self
            .invoke(&Subcommand::Snapshots { json: true }, OutputMode::Capture)?
            .into_checked()?;
        Ok(invocation.stdout)
    }

    fn probe_access(&self) -> Result<String> {
        let invocation = self
            .invoke(&Subcommand::Snapshots { json: false }, OutputMode::Capture)?
            .into_checked()?;
        Ok(invocation.combined_output())
    }

    fn restore(&self, snapshot_id: &str, target: &Path) -> Result<()> {
        self.effect(&Subcommand::Restore {
            snapshot_id,
            target,
        })
    }
}

#[cfg(test)]
pub mod testing {
    use std::cell::RefCell;
    use std::path::Path;

    use super::Engine;
    use crate::error::{EngineError, Result};

    #[derive(Default)]
    pub struct FakeEngine {
        pub initialized: bool,
        pub listing: String,
        pub fail_effects: bool,
        pub calls: RefCell<Vec<String>>,
    }

    impl FakeEngine {
        pub fn with_listing(listing: &str) -> Self {
            Self {
                initialized: true,
                listing: listing.to_string(),
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        fn effect(&self, call: String) -> Result<()> {
            self.calls.borrow_mut().push(call.clone());
            if self.fail_effects {
                return Err(EngineError::Failed {
                    command: call,
                    code: 1,
                    output: "Fatal: simulated failure".to_string(),
                }
                .into());
            }
            Ok(())
        }
    }

    impl Engine for FakeEngine {
        fn is_initialized(&self) -> Result<bool> {
            self.calls.borrow_mut().push("snapshots".to_string());
            Ok(self.initialized)
        }

        fn init(&self) -> Result<()> {
            self.effect("init".to_string())
        }

        fn backup(&self, paths: &[String], tag: Option<&str>) -> Result<()> {
            self.effect(format!("backup {} --tag {}", paths.join(" "), tag.unwrap_or("-")))
        }

        fn snapshots_json(&self) -> Result<Vec<u8>> {
            self.calls.borrow_mut().push("snapshots --json".to_string());
            Ok(self.listing.as_bytes().to_vec())
        }

        fn probe_access(&self) -> Result<String> {
            self.calls.borrow_mut().push("snapshots".to_string());
            if self.fail_effects {
                return Err(EngineError::Failed {
                    command: "snapshots".to_string(),
                    code: 1,
                    output: "Fatal: wrong password or no key found".to_string(),
                }
                .into());
            }
            Ok("ID        Time                 Host\n".to_string())
        }

        fn restore(&self, snapshot_id: &str, target: &Path) -> Result<()> {
            self.effect(format!("restore {} --target {}", snapshot_id, target.display()))
        }
    }
}
