pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod restore;
pub mod secrets;
pub mod snapshot;
pub mod types;
pub mod util;

pub use config::ConfigRecord;
pub use error::{PersephoneError, Result};
pub use types::{Elevation, RunMode, SnapshotId};
