//! CLI command handlers
//!
//! - argument parsing structures ([`args`])
//! - routing to command implementations ([`router`])
//! - the `run` and `variants` commands ([`commands`])

pub mod args;
pub mod commands;
pub mod router;

pub use args::{Cli, Commands, RunArgs};
pub use router::execute_command as run;
