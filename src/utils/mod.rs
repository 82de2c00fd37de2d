//! Helpers shared by the binary and the library

pub mod config_paths;
pub mod logger;

pub use config_paths::{ConfigPaths, Settings};
pub use logger::init_logger;
