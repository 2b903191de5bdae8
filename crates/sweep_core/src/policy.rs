use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{FetchTask, Outcome};

/// Bounded retry with capped exponential backoff.
///
/// Retries are disabled by default (`max_retries == 0`). When enabled, a task
/// whose attempt ended in `RateLimited` or `NetworkError` (and `Timeout` if
/// `retry_timeouts` is set) is retried after `base_delay * 2^n`, where `n` is
/// the number of retries already made, capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_retries: u32,
    #[serde(with = "crate::serde_duration::millis")]
    pub base_delay: Duration,
    #[serde(with = "crate::serde_duration::millis")]
    pub max_delay: Duration,
    pub retry_timeouts: bool,
    /// Wait at least as long as a `Retry-After` header asks, within `max_delay`.
    pub honor_retry_after: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            retry_timeouts: false,
            honor_retry_after: true,
        }
    }
}

impl RetryPolicy {
    pub fn is_enabled(&self) -> bool {
        self.max_retries > 0
    }

    /// Effective policy for a task, applying its retry override if any.
    pub fn for_task(&self, task: &FetchTask) -> Self {
        Self {
            max_retries: task.max_retries().unwrap_or(self.max_retries),
            ..*self
        }
    }

    pub fn is_retryable(&self, outcome: Outcome) -> bool {
        match outcome {
            Outcome::RateLimited | Outcome::NetworkError => true,
            Outcome::Timeout => self.retry_timeouts,
            Outcome::Success | Outcome::HttpError(_) | Outcome::UnknownError => false,
        }
    }

    /// Backoff before retry number `retry` (0 for the first retry).
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let factor = 2_u32.checked_pow(retry).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Backoff combined with a server-provided `Retry-After` hint.
    pub fn retry_delay(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        let backoff = self.backoff_delay(retry);
        match retry_after {
            Some(hint) if self.honor_retry_after => backoff.max(hint).min(self.max_delay),
            _ => backoff,
        }
    }
}
