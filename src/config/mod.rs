pub mod fields;
pub mod load;
pub mod model;
pub mod save;

pub use load::load_config;
pub use model::ConfigRecord;
pub use save::{persist_config, save_config};
