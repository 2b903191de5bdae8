use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use sweep_engine::{PoolEvent, ProgressSink};
use sweep_logging::{sweep_debug, sweep_info};

/// Logs a progress line every `every` finished tasks.
pub struct LoggingProgressSink {
    total: usize,
    every: usize,
    started: Instant,
    finished: AtomicUsize,
    succeeded: AtomicUsize,
}

impl LoggingProgressSink {
    pub fn new(total: usize, every: usize) -> Self {
        Self {
            total,
            every,
            started: Instant::now(),
            finished: AtomicUsize::new(0),
            succeeded: AtomicUsize::new(0),
        }
    }
}

impl ProgressSink for LoggingProgressSink {
    fn emit(&self, event: PoolEvent) {
        match event {
            PoolEvent::TaskFinished(result) => {
                if result.is_success() {
                    self.succeeded.fetch_add(1, Ordering::Relaxed);
                }
                let done = self.finished.fetch_add(1, Ordering::Relaxed) + 1;
                if self.every == 0 || done % self.every != 0 {
                    return;
                }
                let secs = self.started.elapsed().as_secs_f64();
                let rate = if secs > 0.0 { done as f64 / secs } else { 0.0 };
                sweep_info!(
                    "Progress {}/{} ({:.1}/sec, {}/{} success)",
                    done,
                    self.total,
                    rate,
                    self.succeeded.load(Ordering::Relaxed),
                    done
                );
            }
            PoolEvent::RetryScheduled {
                task_id,
                attempt,
                delay,
            } => {
                sweep_debug!(
                    "Task {} retrying after attempt {} in {:?}",
                    task_id,
                    attempt,
                    delay
                );
            }
            PoolEvent::TaskStarted { .. } | PoolEvent::AttemptFailed { .. } => {}
        }
    }
}
