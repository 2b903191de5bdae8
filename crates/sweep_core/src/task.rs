/// Enqueue index of a task within a run.
pub type TaskId = usize;

/// One URL to retrieve. Immutable once handed to a pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTask {
    url: String,
    max_retries: Option<u32>,
}

impl FetchTask {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_retries: None,
        }
    }

    /// Override the pool's retry budget for this task only.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }
}

impl From<&str> for FetchTask {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for FetchTask {
    fn from(url: String) -> Self {
        Self::new(url)
    }
}
