use crate::Outcome;

/// Lifecycle of a single task.
///
/// `Pending -> Attempting -> {Succeeded, Retrying, Failed}` and
/// `Retrying -> Attempting` once the backoff has elapsed. Attempt numbers are
/// 1-based and count attempts started so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskState {
    #[default]
    Pending,
    Attempting { attempt: u32 },
    Retrying { attempt: u32, last: Outcome },
    Succeeded { attempts: u32 },
    Failed { attempts: u32, outcome: Outcome },
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Succeeded { .. } | TaskState::Failed { .. })
    }

    pub fn attempts(&self) -> u32 {
        match *self {
            TaskState::Pending => 0,
            TaskState::Attempting { attempt } | TaskState::Retrying { attempt, .. } => attempt,
            TaskState::Succeeded { attempts } | TaskState::Failed { attempts, .. } => attempts,
        }
    }

    /// Terminal outcome, once reached.
    pub fn outcome(&self) -> Option<Outcome> {
        match *self {
            TaskState::Succeeded { .. } => Some(Outcome::Success),
            TaskState::Failed { outcome, .. } => Some(outcome),
            _ => None,
        }
    }
}
