use std::time::Duration;

use crate::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskMsg {
    /// The task was claimed by an executor.
    Start,
    /// The in-flight attempt reached an outcome.
    AttemptFinished {
        outcome: Outcome,
        /// Server `Retry-After` hint, if the response carried one.
        retry_after: Option<Duration>,
    },
    /// The backoff sleep requested by `TaskEffect::Sleep` has elapsed.
    BackoffElapsed,
    /// The run was cancelled.
    Cancelled,
}
