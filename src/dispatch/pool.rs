//! Bounded worker pool over a job queue
//!
//! A fixed number of workers drain a shared queue of [`DispatchJob`]s. Each
//! job makes exactly one transport call, bounded by the call timeout, and
//! produces exactly one [`Outcome`] which is sent on the result channel as soon
//! as it is known. A timeout, transport error, non-success status or panic in
//! one job never affects any other job.

use super::request::TransportResponse;
use super::transport::{Transport, TransportError};
use crate::collector::Outcome;
use crate::error::RecordError;
use crate::job::{DispatchJob, JobBuilder};
use crate::source::RowIndex;
use futures::future::join_all;
use futures::FutureExt;
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

/// Default number of concurrent in-flight calls
pub const DEFAULT_MAX_IN_FLIGHT: usize = 10;
/// Default per-call timeout
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);
/// Default number of response-body characters kept on failure
pub const DEFAULT_BODY_PREFIX_CHARS: usize = 100;

/// Dispatcher tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchOptions {
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    #[serde(default = "default_call_timeout", with = "humantime_serde")]
    pub call_timeout: Duration,

    #[serde(default = "default_body_prefix_chars")]
    pub body_prefix_chars: usize,
}

fn default_max_in_flight() -> usize {
    DEFAULT_MAX_IN_FLIGHT
}

fn default_call_timeout() -> Duration {
    DEFAULT_CALL_TIMEOUT
}

fn default_body_prefix_chars() -> usize {
    DEFAULT_BODY_PREFIX_CHARS
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            body_prefix_chars: DEFAULT_BODY_PREFIX_CHARS,
        }
    }
}

/// Result sender shared by every worker
pub type ResultSender = mpsc::UnboundedSender<(RowIndex, Outcome)>;

/// Executes dispatch jobs against a shared transport
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    options: DispatchOptions,
    progress: ProgressBar,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, options: DispatchOptions) -> Self {
        Self {
            transport,
            options,
            progress: ProgressBar::hidden(),
        }
    }

    /// Tick the given progress bar once per finished job
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Run every job and send one `(row, outcome)` per job on `results`
    ///
    /// Returns once all jobs have finished. The sender is dropped on return so
    /// a collector draining the matching receiver terminates.
    pub async fn dispatch(
        &self,
        jobs: Vec<DispatchJob>,
        interpreter: Arc<dyn JobBuilder>,
        results: ResultSender,
    ) {
        let total = jobs.len();
        if total == 0 {
            debug!("No jobs to dispatch");
            return;
        }

        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        for job in jobs {
            // Receiver is alive until the workers below finish.
            let _ = queue_tx.send(job);
        }
        drop(queue_tx);
        let queue = Arc::new(Mutex::new(queue_rx));

        let worker_count = self.options.max_in_flight.max(1).min(total);
        info!(
            "Dispatching {} jobs with {} workers (timeout {:?})",
            total, worker_count, self.options.call_timeout
        );

        let workers = (0..worker_count).map(|worker_id| {
            let ctx = WorkerContext {
                worker_id,
                queue: queue.clone(),
                transport: self.transport.clone(),
                interpreter: interpreter.clone(),
                results: results.clone(),
                options: self.options.clone(),
                progress: self.progress.clone(),
            };
            tokio::spawn(run_worker(ctx))
        });

        for (worker_id, joined) in join_all(workers).await.into_iter().enumerate() {
            if let Err(e) = joined {
                error!("Dispatch worker {} terminated abnormally: {}", worker_id, e);
            }
        }
    }
}

struct WorkerContext {
    worker_id: usize,
    queue: Arc<Mutex<mpsc::UnboundedReceiver<DispatchJob>>>,
    transport: Arc<dyn Transport>,
    interpreter: Arc<dyn JobBuilder>,
    results: ResultSender,
    options: DispatchOptions,
    progress: ProgressBar,
}

async fn run_worker(ctx: WorkerContext) {
    loop {
        // Lock is held only while taking the next job.
        let next = { ctx.queue.lock().await.recv().await };
        let Some(job) = next else {
            debug!("Worker {} found queue empty", ctx.worker_id);
            break;
        };

        let row = job.row;
        let outcome = AssertUnwindSafe(execute_job(&ctx, &job))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                ctx.interpreter.describe_failure(
                    &job.key,
                    RecordError::Internal("job panicked during dispatch".to_string()),
                )
            });

        log_outcome(&job, &outcome);
        ctx.progress.inc(1);
        if ctx.results.send((row, outcome)).is_err() {
            warn!("Result receiver dropped; outcome for {} lost", row);
        }
    }
}

async fn execute_job(ctx: &WorkerContext, job: &DispatchJob) -> Outcome {
    let call = ctx.transport.submit(&job.endpoint, &job.payload);
    let response = match tokio::time::timeout(ctx.options.call_timeout, call).await {
        Ok(response) => response,
        Err(_) => Err(TransportError::Timeout(ctx.options.call_timeout)),
    };
    interpret_response(
        response,
        job,
        ctx.interpreter.as_ref(),
        ctx.options.body_prefix_chars,
    )
}

/// Map a transport result onto the job's outcome
pub fn interpret_response(
    response: Result<TransportResponse, TransportError>,
    job: &DispatchJob,
    interpreter: &dyn JobBuilder,
    body_prefix_chars: usize,
) -> Outcome {
    match response {
        Ok(response) if response.is_success() => {
            Outcome::success(interpreter.describe_success(job, &response))
        }
        Ok(response) => interpreter.describe_failure(
            &job.key,
            RecordError::RemoteStatus {
                status: response.status,
                body: response.body_prefix(body_prefix_chars),
            },
        ),
        Err(e) => interpreter.describe_failure(&job.key, RecordError::Network(e.to_string())),
    }
}

fn log_outcome(job: &DispatchJob, outcome: &Outcome) {
    match outcome {
        Outcome::Success { .. } => {
            info!(row = job.row.sheet_row(), key = %job.key, "{}", outcome)
        }
        Outcome::Failure { category, .. } => warn!(
            row = job.row.sheet_row(),
            key = %job.key,
            category = category.as_str(),
            "{}",
            outcome
        ),
    }
}
