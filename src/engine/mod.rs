//! Batch reconciliation engine
//!
//! Control flow of one run:
//!
//! 1. configuration is validated when the [`Reconciler`] is created (fatal)
//! 2. records are read up to the sentinel
//! 3. each record becomes a job or a pre-dispatch failure
//! 4. jobs are dispatched on the worker pool
//! 5. outcomes are collected by row and handed to the writer
//!
//! Record-level problems never fail the run; each one becomes the failure
//! outcome of its row.

use crate::collector::{Outcome, ResultCollector, ResultSet};
use crate::config::{ConfigValidator, RunConfig, Settings};
use crate::dispatch::{DispatchOptions, Dispatcher, Transport};
use crate::error::RecordError;
use crate::job::{BuildContext, DispatchJob, JobBuilder};
use crate::mapping::{IdentifierResolver, MappingTable};
use crate::source::{read_until_sentinel, RecordSource, RowIndex};
use crate::variant::Variant;
use crate::writer::ResultWriter;
use crate::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Engine tuning shared by every variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineOptions {
    #[serde(default)]
    pub dispatch: DispatchOptions,

    /// Show a progress bar while dispatching
    #[serde(default)]
    pub show_progress: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            dispatch: DispatchOptions::default(),
            show_progress: false,
        }
    }
}

impl EngineOptions {
    /// Defaults for a variant (call timeout differs per variant)
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            dispatch: DispatchOptions {
                call_timeout: variant.default_call_timeout(),
                ..DispatchOptions::default()
            },
            ..Self::default()
        }
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.dispatch.max_in_flight = max_in_flight.max(1);
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.dispatch.call_timeout = timeout;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }
}

/// Per-row line of a [`RunReport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowReport {
    pub row: RowIndex,
    pub sheet_row: usize,
    pub outcome: Outcome,
}

/// Summary of a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub variant: Variant,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub rows: Vec<RowReport>,
}

impl RunReport {
    fn new(variant: Variant, results: &ResultSet) -> Self {
        Self {
            variant,
            total: results.len(),
            succeeded: results.succeeded(),
            failed: results.failed(),
            rows: results
                .iter()
                .map(|(row, outcome)| RowReport {
                    row,
                    sheet_row: row.sheet_row(),
                    outcome: outcome.clone(),
                })
                .collect(),
        }
    }
}

/// Jobs and pre-dispatch failures for a batch of records
#[derive(Debug, Default)]
pub struct BatchPlan {
    pub jobs: Vec<DispatchJob>,
    pub rejected: Vec<(RowIndex, Outcome)>,
}

impl BatchPlan {
    pub fn rows(&self) -> impl Iterator<Item = RowIndex> + '_ {
        self.jobs
            .iter()
            .map(|job| job.row)
            .chain(self.rejected.iter().map(|(row, _)| *row))
    }

    pub fn len(&self) -> usize {
        self.jobs.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Runs one variant over one record source
pub struct Reconciler {
    variant: Variant,
    config: Arc<RunConfig>,
    resolver: Arc<IdentifierResolver>,
    builder: Arc<dyn JobBuilder>,
    options: EngineOptions,
}

impl Reconciler {
    /// Validate configuration for `variant`; fails before any record is read
    pub fn new(variant: Variant, settings: &Settings, options: EngineOptions) -> Result<Self> {
        let config = ConfigValidator::validate(settings, variant.required_keys())?;
        let suffix = variant
            .suffix_key()
            .and_then(|key| config.get(key))
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            variant,
            resolver: Arc::new(IdentifierResolver::new(MappingTable::empty(), suffix)),
            config: Arc::new(config),
            builder: variant.builder(),
            options,
        })
    }

    /// Use `table` to resolve external identifiers
    pub fn with_mapping(mut self, table: MappingTable) -> Self {
        let suffix = self.resolver.suffix().to_string();
        self.resolver = Arc::new(IdentifierResolver::new(table, suffix));
        self
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Read records up to the sentinel and build their jobs without dispatching
    pub fn plan<S: RecordSource + ?Sized>(&self, source: &mut S) -> Result<BatchPlan> {
        let records = read_until_sentinel(source, self.variant.primary_field())?;
        info!("Read {} {} records", records.len(), self.variant);

        let ctx = BuildContext::new(&self.config, &self.resolver);
        let mut plan = BatchPlan::default();
        for record in &records {
            let key = record.field(self.variant.primary_field()).unwrap_or_default();
            let built = match record.invalid_field() {
                Some(field) => Err(RecordError::InvalidEncoding {
                    field: field.to_string(),
                }),
                None => self.builder.build(record, &ctx),
            };
            match built {
                Ok(job) => plan.jobs.push(job),
                Err(e) => {
                    warn!(
                        row = record.index().sheet_row(),
                        key = key,
                        "Error: {}",
                        e
                    );
                    plan.rejected
                        .push((record.index(), self.builder.describe_failure(key, e)));
                }
            }
        }
        Ok(plan)
    }

    /// Execute a full run and hand the results to `writer`
    pub async fn run<S, W>(
        &self,
        source: &mut S,
        transport: Arc<dyn Transport>,
        writer: &mut W,
    ) -> Result<RunReport>
    where
        S: RecordSource + ?Sized,
        W: ResultWriter + ?Sized,
    {
        let plan = self.plan(source)?;
        let results = self.execute(plan, transport).await;
        writer.write(&results)?;

        let report = RunReport::new(self.variant, &results);
        info!(
            "Processing complete: {} records, {} succeeded, {} failed",
            report.total, report.succeeded, report.failed
        );
        Ok(report)
    }

    /// Dispatch a plan and collect every row's outcome
    pub async fn execute(&self, plan: BatchPlan, transport: Arc<dyn Transport>) -> ResultSet {
        let mut collector = ResultCollector::new(plan.rows());
        for (row, outcome) in plan.rejected {
            collector.record(row, outcome);
        }

        let progress = self.progress_bar(plan.jobs.len());
        let dispatcher = Dispatcher::new(transport, self.options.dispatch.clone())
            .with_progress(progress.clone());

        let (tx, rx) = mpsc::unbounded_channel();
        let dispatch = dispatcher.dispatch(plan.jobs, self.builder.clone(), tx);
        tokio::join!(dispatch, collector.drain(rx));
        progress.finish_and_clear();

        collector.finish()
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        ) {
            pb.set_style(style.progress_chars("█▓▒░ "));
        }
        pb.set_message(format!("Dispatching {}", self.variant));
        pb
    }
}
