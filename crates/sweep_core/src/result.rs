use std::time::Duration;

use serde::Serialize;

use crate::{Outcome, TaskId};

/// Terminal outcome of one task. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchResult {
    pub task_id: TaskId,
    pub url: String,
    pub outcome: Outcome,
    /// HTTP status of the last completed exchange, if any.
    pub status: Option<u16>,
    pub message: Option<String>,
    /// Claim to terminal state, including backoff sleeps.
    #[serde(rename = "elapsed_ms", with = "crate::serde_duration::millis")]
    pub elapsed: Duration,
    /// Body bytes received by the last attempt.
    pub bytes: u64,
    pub attempts: u32,
    pub worker: usize,
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}
