//! CLI argument structures

use crate::variant::Variant;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Push spreadsheet rows to a remote web application, concurrently
#[derive(Parser, Debug)]
#[command(name = "sheetsync")]
#[command(about = "sheetsync - Reconcile spreadsheet rows against a remote system", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process an input file with one variant and write the outcomes back
    #[command(name = "run")]
    Run(RunArgs),

    /// List the available variants
    #[command(name = "variants")]
    Variants,
}

impl Commands {
    pub fn wants_json(&self) -> bool {
        matches!(self, Commands::Run(args) if args.json)
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Variant to run
    #[arg(value_enum)]
    pub variant: Variant,

    /// Input CSV with one record per row
    #[arg(short, long)]
    pub input: PathBuf,

    /// Two-column key/value configuration CSV
    #[arg(short = 'c', long)]
    pub config: PathBuf,

    /// External to internal identifier mapping CSV
    #[arg(short, long)]
    pub mapping: Option<PathBuf>,

    /// Output CSV (defaults to <input>_updated.csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum concurrent requests
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Build requests without sending them
    #[arg(long, help = "Preview requests without sending them")]
    pub dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}
