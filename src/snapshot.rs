use std::collections::HashSet;

use serde::Deserialize;
use tracing::debug;

use crate::engine::Engine;
use crate::error::{CatalogError, Result};

const SHORT_ID_LEN: usize = 8;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub short_id: String,
    pub time: String,
    #[serde(default)]
    pub paths: Vec<String>,
}

impl Snapshot {
    pub fn first_path(&self) -> &str {
        self.paths.first().map(String::as_str).unwrap_or("N/A")
    }
}

/// Snapshots in the order the engine returned them. Positions are 1-based.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCatalog {
    snapshots: Vec<Snapshot>,
}

impl SnapshotCatalog {
    pub fn parse(raw: &[u8]) -> std::result::Result<Self, CatalogError> {
        let parse_err = |reason: String| CatalogError::Parse {
            reason,
            raw: String::from_utf8_lossy(raw).to_string(),
        };
        let listed: Option<Vec<Snapshot>> =
            serde_json::from_slice(raw).map_err(|e| parse_err(e.to_string()))?;
        let mut snapshots = listed.unwrap_or_default();
        let mut seen = HashSet::new();
        for snap in &mut snapshots {
            if snap.short_id.is_empty() {
                snap.short_id = snap.id.chars().take(SHORT_ID_LEN).collect();
            }
            if snap.short_id.is_empty() {
                return Err(parse_err("snapshot without an id".to_string()));
            }
            if !seen.insert(snap.short_id.clone()) {
                return Err(parse_err(format!("duplicate snapshot id {}", snap.short_id)));
            }
        }
        Ok(Self { snapshots })
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Snapshot> {
        position
            .checked_sub(1)
            .and_then(|idx| self.snapshots.get(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    pub fn render_lines(&self) -> Vec<String> {
        self.snapshots
            .iter()
            .enumerate()
            .map(|(idx, snap)| {
                format!(
                    "{:3}) {}  {}  {}",
                    idx + 1,
                    snap.short_id,
                    snap.time,
                    snap.first_path()
                )
            })
            .collect()
    }
}

/// Asks the engine for a structured listing. An empty listing is an error so
/// callers never reach selection with nothing to choose from.
pub fn list_snapshots<E: Engine + ?Sized>(engine: &E) -> Result<SnapshotCatalog> {
    let raw = engine.snapshots_json()?;
    let catalog = SnapshotCatalog::parse(&raw)?;
    debug!(count = catalog.len(), "snapshot listing parsed");
    if catalog.is_empty() {
        return Err(CatalogError::Empty.into());
    }
    Ok(catalog)
}
