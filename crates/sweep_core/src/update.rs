use crate::{Outcome, RetryPolicy, TaskEffect, TaskMsg, TaskState};

/// Pure transition function: applies a message to a task's state and returns
/// the effect the executor must carry out, if any.
///
/// Messages that do not apply to the current state leave it unchanged.
/// `policy` is the effective policy for this task (see `RetryPolicy::for_task`).
pub fn update(state: TaskState, msg: TaskMsg, policy: &RetryPolicy) -> (TaskState, Option<TaskEffect>) {
    match (state, msg) {
        (TaskState::Pending, TaskMsg::Start) => (
            TaskState::Attempting { attempt: 1 },
            Some(TaskEffect::Attempt { attempt: 1 }),
        ),
        (
            TaskState::Attempting { attempt },
            TaskMsg::AttemptFinished {
                outcome,
                retry_after,
            },
        ) => {
            if outcome.is_success() {
                return (
                    TaskState::Succeeded { attempts: attempt },
                    Some(TaskEffect::Finalize {
                        outcome,
                        attempts: attempt,
                    }),
                );
            }
            let retries_used = attempt - 1;
            if policy.is_retryable(outcome) && retries_used < policy.max_retries {
                let delay = policy.retry_delay(retries_used, retry_after);
                (
                    TaskState::Retrying {
                        attempt,
                        last: outcome,
                    },
                    Some(TaskEffect::Sleep { delay }),
                )
            } else {
                (
                    TaskState::Failed {
                        attempts: attempt,
                        outcome,
                    },
                    Some(TaskEffect::Finalize {
                        outcome,
                        attempts: attempt,
                    }),
                )
            }
        }
        (TaskState::Retrying { attempt, .. }, TaskMsg::BackoffElapsed) => {
            let next = attempt + 1;
            (
                TaskState::Attempting { attempt: next },
                Some(TaskEffect::Attempt { attempt: next }),
            )
        }
        (TaskState::Attempting { attempt } | TaskState::Retrying { attempt, .. }, TaskMsg::Cancelled) => (
            TaskState::Failed {
                attempts: attempt,
                outcome: Outcome::NetworkError,
            },
            Some(TaskEffect::Finalize {
                outcome: Outcome::NetworkError,
                attempts: attempt,
            }),
        ),
        (state, _) => (state, None),
    }
}
