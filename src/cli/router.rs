//! Command routing and execution

use crate::app::AppConfig;
use crate::cli::args::Commands;
use crate::cli::commands::{run_reconcile, run_variants};
use anyhow::Result;

/// Execute a CLI command based on the parsed arguments
pub async fn execute_command(command: Commands, app: &AppConfig) -> Result<()> {
    match command {
        Commands::Run(args) => run_reconcile(args, app).await,
        Commands::Variants => run_variants(),
    }
}
