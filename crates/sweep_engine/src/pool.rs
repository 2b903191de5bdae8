use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;

use serde::{Deserialize, Serialize};
use sweep_core::{
    serde_duration, update, FetchResult, FetchTask, Outcome, RetryPolicy, RunSummary, TaskEffect,
    TaskId, TaskMsg, TaskState,
};
use sweep_logging::{sweep_debug, sweep_error, sweep_info, sweep_warn};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::progress::{NullProgressSink, PoolEvent, ProgressSink};
use crate::queue::{ResultLog, WorkQueue};
use crate::{FetchError, FetchOutput, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Concurrent executors; also the cap on in-flight requests.
    pub worker_count: usize,
    /// Enforced around every transport call.
    #[serde(with = "serde_duration::millis")]
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    /// Cancel the whole run once this much wall-clock time has passed.
    #[serde(with = "serde_duration::option_millis")]
    pub run_budget: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_count: 8,
            request_timeout: Duration::from_secs(15),
            retry: RetryPolicy::default(),
            run_budget: None,
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.worker_count < 1 {
            return Err(PoolError::InvalidConfig(
                "worker_count must be at least 1".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(PoolError::InvalidConfig(
                "request_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Raw results of a run plus what is needed to summarize them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// In completion order.
    pub results: Vec<FetchResult>,
    pub elapsed: Duration,
    pub skipped: usize,
}

impl RunReport {
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_results(&self.results, self.elapsed, self.skipped)
    }
}

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),
    #[error(
        "run cancelled: {} tasks finished, {} skipped",
        .report.results.len(),
        .report.skipped
    )]
    Cancelled { report: Box<RunReport> },
    #[error("worker {worker} stopped abnormally: {message}")]
    Worker {
        worker: usize,
        message: String,
        report: Box<RunReport>,
    },
}

impl PoolError {
    /// Summary of what completed before the run stopped early.
    pub fn partial_summary(&self) -> Option<RunSummary> {
        match self {
            PoolError::Cancelled { report } | PoolError::Worker { report, .. } => {
                Some(report.summary())
            }
            PoolError::InvalidConfig(_) => None,
        }
    }
}

/// Fetches a list of URLs with at most `worker_count` requests in flight.
pub struct FetchPool {
    transport: Arc<dyn Transport>,
    sink: Arc<dyn ProgressSink>,
    config: PoolConfig,
}

impl FetchPool {
    pub fn new(transport: Arc<dyn Transport>, config: PoolConfig) -> Self {
        Self {
            transport,
            sink: Arc::new(NullProgressSink),
            config,
        }
    }

    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Run every task to a terminal result and summarize.
    ///
    /// Individual fetch failures are recorded, never returned. Cancelling
    /// `cancel` (or exhausting `run_budget`) stops new claims, aborts
    /// in-flight fetches as `NetworkError`, and returns
    /// `PoolError::Cancelled` carrying what finished.
    pub async fn run<I, T>(&self, tasks: I, cancel: &CancellationToken) -> Result<RunSummary, PoolError>
    where
        I: IntoIterator<Item = T>,
        T: Into<FetchTask>,
    {
        self.run_detailed(tasks, cancel)
            .await
            .map(|report| report.summary())
    }

    /// Like `run`, but returns the individual results as well.
    pub async fn run_detailed<I, T>(
        &self,
        tasks: I,
        cancel: &CancellationToken,
    ) -> Result<RunReport, PoolError>
    where
        I: IntoIterator<Item = T>,
        T: Into<FetchTask>,
    {
        self.config.validate()?;

        let tasks: Vec<FetchTask> = tasks.into_iter().map(Into::into).collect();
        if tasks.is_empty() {
            return Ok(RunReport {
                results: Vec::new(),
                elapsed: Duration::ZERO,
                skipped: 0,
            });
        }

        let task_count = tasks.len();
        let worker_count = self.config.worker_count.min(task_count);
        sweep_info!(
            "Run started tasks={} workers={} timeout={:?} max_retries={}",
            task_count,
            worker_count,
            self.config.request_timeout,
            self.config.retry.max_retries
        );

        let started = Instant::now();
        let run_token = cancel.child_token();
        let budget_timer = self.config.run_budget.map(|budget| {
            let token = run_token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(budget).await;
                sweep_warn!("Run budget of {:?} exhausted, cancelling", budget);
                token.cancel();
            })
        });

        let executor = Executor {
            transport: self.transport.clone(),
            sink: self.sink.clone(),
            queue: Arc::new(WorkQueue::new(tasks)),
            log: Arc::new(ResultLog::with_capacity(task_count)),
            cancel: run_token.clone(),
            request_timeout: self.config.request_timeout,
            retry: self.config.retry,
        };

        let handles: Vec<_> = (0..worker_count)
            .map(|worker| {
                let executor = executor.clone();
                tokio::spawn(async move { executor.work(worker).await })
            })
            .collect();
        let joined = futures_util::future::join_all(handles).await;

        if let Some(timer) = budget_timer {
            timer.abort();
        }

        let mut interrupted = false;
        let mut crashed = None;
        for (worker, outcome) in joined.into_iter().enumerate() {
            match outcome {
                Ok(worker_interrupted) => interrupted |= worker_interrupted,
                Err(err) => {
                    sweep_error!("Worker {} stopped abnormally: {}", worker, err);
                    if crashed.is_none() {
                        crashed = Some((worker, err.to_string()));
                    }
                }
            }
        }

        let skipped = executor.queue.remaining();
        let results = executor.log.take();
        let report = RunReport {
            results,
            elapsed: started.elapsed(),
            skipped,
        };

        let summary = report.summary();
        sweep_info!(
            "Run finished attempted={} succeeded={} failed={} skipped={} elapsed={:?}",
            summary.attempted,
            summary.succeeded,
            summary.failed(),
            summary.skipped,
            summary.elapsed
        );

        if let Some((worker, message)) = crashed {
            return Err(PoolError::Worker {
                worker,
                message,
                report: Box::new(report),
            });
        }
        if interrupted || skipped > 0 {
            return Err(PoolError::Cancelled {
                report: Box::new(report),
            });
        }
        Ok(report)
    }
}

/// State shared by the executors of one run.
#[derive(Clone)]
struct Executor {
    transport: Arc<dyn Transport>,
    sink: Arc<dyn ProgressSink>,
    queue: Arc<WorkQueue>,
    log: Arc<ResultLog>,
    cancel: CancellationToken,
    request_timeout: Duration,
    retry: RetryPolicy,
}

/// What the last attempt of a task produced.
#[derive(Debug, Default)]
struct AttemptRecord {
    status: Option<u16>,
    bytes: u64,
    message: Option<String>,
}

impl Executor {
    /// Pull tasks until the queue is drained or the run is cancelled.
    /// Returns whether cancellation cut the work short.
    async fn work(self, worker: usize) -> bool {
        sweep_debug!("Worker {} started", worker);
        let mut interrupted = false;
        loop {
            if self.cancel.is_cancelled() {
                interrupted |= self.queue.remaining() > 0;
                break;
            }
            let Some((task_id, task)) = self.queue.claim() else {
                break;
            };
            let Some((result, cancelled)) = self.execute(worker, task_id, task).await else {
                self.queue.release();
                interrupted = true;
                break;
            };
            interrupted |= cancelled;
            if !result.is_success() {
                sweep_warn!(
                    "Task {} failed after {} attempt(s): {} url={}",
                    task_id,
                    result.attempts,
                    result.outcome,
                    result.url
                );
            }
            self.sink.emit(PoolEvent::TaskFinished(result.clone()));
            self.log.push(result);
        }
        sweep_debug!("Worker {} stopped interrupted={}", worker, interrupted);
        interrupted
    }

    /// Drive one task through the retry state machine to a terminal result.
    /// `None` when the run was cancelled before the first request went out.
    async fn execute(
        &self,
        worker: usize,
        task_id: TaskId,
        task: &FetchTask,
    ) -> Option<(FetchResult, bool)> {
        let policy = self.retry.for_task(task);
        let started = Instant::now();
        let mut record = AttemptRecord::default();
        let mut cancelled = false;

        self.sink.emit(PoolEvent::TaskStarted { task_id, worker });
        let (mut state, mut effect) = update(TaskState::Pending, TaskMsg::Start, &policy);

        let (outcome, attempts) = loop {
            let msg = match effect {
                Some(TaskEffect::Attempt { attempt }) => {
                    match self.attempt(task.url()).await {
                        Attempted::Finished(AttemptReport {
                            outcome,
                            retry_after,
                            record: latest,
                        }) => {
                            record = latest;
                            if !outcome.is_success() {
                                sweep_debug!(
                                    "Task {} attempt {} ended: {}",
                                    task_id,
                                    attempt,
                                    outcome
                                );
                                self.sink.emit(PoolEvent::AttemptFailed {
                                    task_id,
                                    attempt,
                                    outcome,
                                });
                            }
                            TaskMsg::AttemptFinished {
                                outcome,
                                retry_after,
                            }
                        }
                        Attempted::NotSent if attempt == 1 => return None,
                        Attempted::NotSent => {
                            cancelled = true;
                            record.message = Some("cancelled during backoff".to_string());
                            TaskMsg::Cancelled
                        }
                        Attempted::Cancelled => {
                            cancelled = true;
                            record = AttemptRecord {
                                message: Some("cancelled while in flight".to_string()),
                                ..AttemptRecord::default()
                            };
                            TaskMsg::Cancelled
                        }
                    }
                }
                Some(TaskEffect::Sleep { delay }) => {
                    self.sink.emit(PoolEvent::RetryScheduled {
                        task_id,
                        attempt: state.attempts(),
                        delay,
                    });
                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => {
                            cancelled = true;
                            record.message = Some("cancelled during backoff".to_string());
                            TaskMsg::Cancelled
                        }
                        _ = tokio::time::sleep(delay) => TaskMsg::BackoffElapsed,
                    }
                }
                Some(TaskEffect::Finalize { outcome, attempts }) => break (outcome, attempts),
                None => break (state.outcome().unwrap_or(Outcome::UnknownError), state.attempts()),
            };
            (state, effect) = update(state, msg, &policy);
        };

        let result = FetchResult {
            task_id,
            url: task.url().to_string(),
            outcome,
            status: record.status,
            message: if outcome.is_success() { None } else { record.message },
            elapsed: started.elapsed(),
            bytes: record.bytes,
            attempts,
            worker,
        };
        Some((result, cancelled))
    }

    /// One transport call bounded by the request timeout. A panic inside the
    /// transport is contained here and reported as `UnknownError`.
    async fn attempt(&self, url: &str) -> Attempted {
        if self.cancel.is_cancelled() {
            return Attempted::NotSent;
        }
        let call = AssertUnwindSafe(self.transport.fetch(url)).catch_unwind();
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Attempted::Cancelled,
            fetched = tokio::time::timeout(self.request_timeout, call) => {
                Attempted::Finished(match fetched {
                    Ok(Ok(result)) => AttemptReport::from_fetch(result),
                    Ok(Err(payload)) => {
                        let report = AttemptReport::panicked(&*payload);
                        sweep_error!("Transport panicked fetching {}", url);
                        report
                    }
                    Err(_) => AttemptReport::timed_out(self.request_timeout),
                })
            }
        }
    }
}

enum Attempted {
    Finished(AttemptReport),
    /// Cancelled before the transport was called.
    NotSent,
    /// Cancelled while the request was in flight.
    Cancelled,
}

struct AttemptReport {
    outcome: Outcome,
    retry_after: Option<Duration>,
    record: AttemptRecord,
}

impl AttemptReport {
    fn from_fetch(result: Result<FetchOutput, FetchError>) -> Self {
        match result {
            Ok(output) => {
                let outcome = Outcome::from_status(output.status);
                let message = (!outcome.is_success()).then(|| format!("http status {}", output.status));
                Self {
                    outcome,
                    retry_after: output.retry_after,
                    record: AttemptRecord {
                        status: Some(output.status),
                        bytes: output.bytes,
                        message,
                    },
                }
            }
            Err(err) => Self {
                outcome: err.kind.outcome(),
                retry_after: None,
                record: AttemptRecord {
                    message: Some(format!("{}: {}", err.kind, err.message)),
                    ..AttemptRecord::default()
                },
            },
        }
    }

    fn panicked(payload: &(dyn Any + Send)) -> Self {
        let detail = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "unknown panic".to_string()
        };
        Self {
            outcome: Outcome::UnknownError,
            retry_after: None,
            record: AttemptRecord {
                message: Some(format!("transport panicked: {detail}")),
                ..AttemptRecord::default()
            },
        }
    }

    fn timed_out(limit: Duration) -> Self {
        Self {
            outcome: Outcome::Timeout,
            retry_after: None,
            record: AttemptRecord {
                message: Some(format!("no response within {limit:?}")),
                ..AttemptRecord::default()
            },
        }
    }
}
