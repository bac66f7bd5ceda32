//! Error handling utilities

use crate::error::Error;
use tracing::error;

/// Exit code for a fatal error
///
/// Configuration problems exit with 2, everything else with 1.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    let is_config = error
        .chain()
        .filter_map(|cause| cause.downcast_ref::<Error>())
        .any(Error::is_config);
    if is_config {
        2
    } else {
        1
    }
}

/// Handle fatal errors and exit with appropriate status code
///
/// - `verbose = 0`: the top-level message only
/// - `verbose >= 1`: the full error chain
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {:#}", error);

    eprintln!("Error: {error:#}");
    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    }

    std::process::exit(exit_code(&error))
}
