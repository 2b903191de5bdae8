use std::time::Duration;

use crate::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEffect {
    /// Start attempt number `attempt` (1-based).
    Attempt { attempt: u32 },
    /// Wait before the next attempt.
    Sleep { delay: Duration },
    /// Record the terminal result.
    Finalize { outcome: Outcome, attempts: u32 },
}
