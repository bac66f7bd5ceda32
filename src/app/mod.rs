//! Application module
//!
//! Process-level concerns of the `sheetsync` binary: verbosity and logging
//! setup, and mapping fatal errors to exit codes.

pub mod config;
pub mod error_handling;
pub mod logging;

pub use config::AppConfig;
pub use error_handling::{exit_code, handle_fatal_error};
pub use logging::init_logging;
