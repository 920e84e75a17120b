pub mod command;
pub mod fs;
pub mod host;
pub mod prompt;
