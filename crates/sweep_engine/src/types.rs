use std::fmt;
use std::time::Duration;

use sweep_core::Outcome;
use thiserror::Error;

/// A completed HTTP exchange, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub status: u16,
    pub final_url: String,
    /// Body length as received; the body itself is not kept.
    pub bytes: u64,
    /// Parsed `Retry-After` header (delta-seconds form only).
    pub retry_after: Option<Duration>,
}

/// A fetch that did not produce an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    Timeout,
    RedirectLimitExceeded,
    /// DNS, connect or IO failure.
    Network,
    Other,
}

impl FailureKind {
    pub fn outcome(&self) -> Outcome {
        match self {
            FailureKind::Timeout => Outcome::Timeout,
            FailureKind::Network => Outcome::NetworkError,
            FailureKind::InvalidUrl | FailureKind::RedirectLimitExceeded | FailureKind::Other => {
                Outcome::UnknownError
            }
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Other => write!(f, "unclassified error"),
        }
    }
}

/// Failure to construct a transport from its settings.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid proxy url {url}: {source}")]
    Proxy {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid header value for {name}")]
    Header { name: &'static str },
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}
