use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use crate::{FetchResult, Outcome};

/// Aggregate statistics over the results of one run.
///
/// Always derived from the result collection; every counter is a plain sum so
/// the order results arrive in does not matter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RunSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub http_errors: usize,
    pub timeouts: usize,
    pub rate_limited: usize,
    pub network_errors: usize,
    pub unknown_errors: usize,
    /// Tasks never claimed because the run was cancelled.
    pub skipped: usize,
    /// Counts of `HttpError` results by status code.
    pub http_error_statuses: BTreeMap<u16, usize>,
    pub total_attempts: u64,
    pub total_bytes: u64,
    #[serde(rename = "elapsed_ms", with = "crate::serde_duration::millis")]
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn from_results<'a, I>(results: I, elapsed: Duration, skipped: usize) -> Self
    where
        I: IntoIterator<Item = &'a FetchResult>,
    {
        let mut summary = Self {
            elapsed,
            skipped,
            ..Self::default()
        };
        for result in results {
            summary.record(result);
        }
        summary
    }

    fn record(&mut self, result: &FetchResult) {
        self.attempted += 1;
        self.total_attempts += u64::from(result.attempts);
        self.total_bytes += result.bytes;
        match result.outcome {
            Outcome::Success => self.succeeded += 1,
            Outcome::HttpError(code) => {
                self.http_errors += 1;
                *self.http_error_statuses.entry(code).or_insert(0) += 1;
            }
            Outcome::Timeout => self.timeouts += 1,
            Outcome::RateLimited => self.rate_limited += 1,
            Outcome::NetworkError => self.network_errors += 1,
            Outcome::UnknownError => self.unknown_errors += 1,
        }
    }

    pub fn failed(&self) -> usize {
        self.http_errors + self.timeouts + self.rate_limited + self.network_errors + self.unknown_errors
    }

    /// Fraction of attempted tasks that succeeded, 0.0 when nothing ran.
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            return 0.0;
        }
        self.succeeded as f64 / self.attempted as f64
    }

    /// Successful tasks per second of wall-clock time.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.succeeded as f64 / secs
        } else {
            0.0
        }
    }
}
