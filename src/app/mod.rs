//! Application module
//!
//! Configuration loading and logging setup for the server binary.

pub mod config;
pub mod logging;

pub use config::{AppConfig, CliOverrides, FileConfig};
pub use logging::init_logging;
