//! Run command implementation
//!
//! Loads configuration, validates it for the chosen variant, then either
//! previews the built requests (`--dry-run`) or performs the full run and
//! writes the outcomes next to the input.

use crate::app::AppConfig;
use crate::cli::args::RunArgs;
use crate::config::loader::ConfigLoader;
use crate::dispatch::HttpTransport;
use crate::engine::{BatchPlan, EngineOptions, Reconciler, RunReport};
use crate::mapping::MappingTable;
use crate::source::CsvRecordSource;
use crate::writer::{default_output_path, CsvResultWriter};
use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Execute one variant over the input file
pub async fn run_reconcile(args: RunArgs, app: &AppConfig) -> Result<()> {
    let settings = ConfigLoader::load(&args.config).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            args.config.display()
        )
    })?;

    let reconciler = Reconciler::new(args.variant, &settings, engine_options(&args, app))
        .with_context(|| format!("Invalid configuration for {}", args.variant))?;
    let reconciler = match &args.mapping {
        Some(path) => {
            reconciler.with_mapping(MappingTable::load(path, &args.variant.mapping_columns()))
        }
        None => {
            debug!("No mapping file given; identifiers come from record fields");
            reconciler
        }
    };

    let mut source = CsvRecordSource::open(&args.input)
        .with_context(|| format!("Failed to open input {}", args.input.display()))?;

    if args.dry_run {
        let plan = reconciler
            .plan(&mut source)
            .with_context(|| format!("Failed to read input {}", args.input.display()))?;
        return print_plan(&plan, app);
    }

    let transport = HttpTransport::from_config(
        reconciler.config(),
        reconciler.options().dispatch.call_timeout,
    )?;
    info!("Submitting to {}", transport.base_url());

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    let mut writer = CsvResultWriter::new(&args.input, &output, args.variant.status_column());

    let report = reconciler
        .run(&mut source, Arc::new(transport), &mut writer)
        .await
        .with_context(|| format!("Run failed for {}", args.input.display()))?;

    print_report(&report, &output, app)
}

fn engine_options(args: &RunArgs, app: &AppConfig) -> EngineOptions {
    let mut options = EngineOptions::for_variant(args.variant)
        .with_progress(!args.no_progress && !app.json_output);
    if let Some(workers) = args.workers {
        options = options.with_max_in_flight(workers);
    }
    if let Some(secs) = args.timeout {
        options = options.with_call_timeout(Duration::from_secs(secs));
    }
    options
}

fn print_plan(plan: &BatchPlan, app: &AppConfig) -> Result<()> {
    if app.json_output {
        let jobs: Vec<_> = plan
            .jobs
            .iter()
            .map(|job| {
                json!({
                    "row": job.row,
                    "sheet_row": job.row.sheet_row(),
                    "key": job.key,
                    "endpoint": job.endpoint.path_and_query(),
                    "payload": job.payload.encode(),
                })
            })
            .collect();
        let rejected: Vec<_> = plan
            .rejected
            .iter()
            .map(|(row, outcome)| {
                json!({
                    "row": row,
                    "sheet_row": row.sheet_row(),
                    "outcome": outcome,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "jobs": jobs, "rejected": rejected }))?
        );
        return Ok(());
    }

    println!("🔍 Dry run: {} records", plan.len());
    for job in &plan.jobs {
        println!(
            "   {} {}: POST {} ({} fields)",
            job.row,
            job.key,
            job.endpoint.path_and_query(),
            job.payload.len()
        );
    }
    for (row, outcome) in &plan.rejected {
        println!("   {}: {}", row, outcome);
    }
    Ok(())
}

fn print_report(report: &RunReport, output: &Path, app: &AppConfig) -> Result<()> {
    if app.json_output {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!(
        "✅ {} of {} records succeeded",
        report.succeeded, report.total
    );
    if report.failed > 0 {
        println!("❌ {} records failed", report.failed);
    }
    println!("Results written to {}", output.display());
    Ok(())
}
