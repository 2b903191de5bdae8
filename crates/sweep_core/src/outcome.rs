use std::fmt;

use serde::Serialize;

/// Terminal classification of a fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success,
    HttpError(u16),
    Timeout,
    RateLimited,
    NetworkError,
    UnknownError,
}

impl Outcome {
    /// Classify a completed HTTP exchange by its status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => Outcome::Success,
            429 | 503 => Outcome::RateLimited,
            code => Outcome::HttpError(code),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::HttpError(code) => write!(f, "http error {code}"),
            Outcome::Timeout => write!(f, "timeout"),
            Outcome::RateLimited => write!(f, "rate limited"),
            Outcome::NetworkError => write!(f, "network error"),
            Outcome::UnknownError => write!(f, "unknown error"),
        }
    }
}
