use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Local};
use tracing::debug;
use walkdir::WalkDir;

use crate::cli::args::InspectArgs;
use crate::error::Result;
use crate::util::prompt::{Prompter, TerminalPrompter};

pub const DEFAULT_ROOTS: [&str; 8] = [
    "/home", "/opt", "/root", "/srv", "/usr", "/etc", "/var", "/tmp",
];

const NEEDLE: &str = "persephone";

#[derive(Debug, Clone)]
pub struct Finding {
    pub path: PathBuf,
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
}

impl Finding {
    pub fn render(&self) -> String {
        let kind = if self.is_dir { "Directory" } else { "File" };
        let modified = self
            .modified
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        format!(
            "{}: {}\n  Size: {} bytes\n  Last Modified: {}\n",
            kind,
            self.path.display(),
            self.size,
            modified
        )
    }
}

pub fn run_inspect(args: InspectArgs) -> Result<()> {
    let roots: Vec<PathBuf> = if args.roots.is_empty() {
        DEFAULT_ROOTS.into_iter().map(PathBuf::from).collect()
    } else {
        args.roots
    };
    let mut prompter = TerminalPrompter;
    for root in &roots {
        if !root.is_dir() {
            prompter.say(&format!(
                "Directory {} does not exist or is not accessible, skipping.",
                root.display()
            ));
            continue;
        }
        prompter.say(&format!("Searching in {}...", root.display()));
        let started = Instant::now();
        for finding in inspect_root(&mut prompter, root) {
            prompter.say(&finding.render());
        }
        prompter.say(&format!(
            "Finished searching {} (took {:.2?})\n",
            root.display(),
            started.elapsed()
        ));
    }
    Ok(())
}

/// Every entry under `root` whose name mentions persephone. Unreadable
/// entries are reported and the walk goes on.
pub fn inspect_root<P: Prompter + ?Sized>(prompter: &mut P, root: &Path) -> Vec<Finding> {
    let mut findings = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                prompter.say(&format!("Error accessing {:?}: {}", path, err));
                continue;
            }
        };
        if !entry.file_name().to_string_lossy().contains(NEEDLE) {
            continue;
        }
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                prompter.say(&format!("Error accessing {:?}: {}", entry.path(), err));
                continue;
            }
        };
        debug!(path = %entry.path().display(), "match");
        findings.push(Finding {
            path: entry.path().to_path_buf(),
            is_dir: metadata.is_dir(),
            size: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Local>::from),
        });
    }
    findings
}
