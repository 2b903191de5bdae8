use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use sweep_core::{FetchResult, FetchTask, TaskId};

/// Shared work queue: an atomic cursor over an immutable task list.
///
/// Each index is handed out exactly once, in enqueue order.
#[derive(Debug)]
pub struct WorkQueue {
    tasks: Vec<FetchTask>,
    next: AtomicUsize,
    released: AtomicUsize,
}

impl WorkQueue {
    pub fn new(tasks: Vec<FetchTask>) -> Self {
        Self {
            tasks,
            next: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        }
    }

    pub fn claim(&self) -> Option<(TaskId, &FetchTask)> {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        self.tasks.get(index).map(|task| (index, task))
    }

    /// Hand back a claimed task that was never started. It is not
    /// reissued, only counted as remaining.
    pub fn release(&self) {
        self.released.fetch_add(1, Ordering::Relaxed);
    }

    /// Tasks not yet claimed, plus released ones.
    pub fn remaining(&self) -> usize {
        let unclaimed = self.tasks.len().saturating_sub(self.next.load(Ordering::Relaxed));
        unclaimed + self.released.load(Ordering::Relaxed)
    }
}

/// Append-only result collection owned by one run.
#[derive(Debug, Default)]
pub struct ResultLog {
    results: Mutex<Vec<FetchResult>>,
}

impl ResultLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            results: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    pub fn push(&self, result: FetchResult) {
        self.lock().push(result);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Move out everything appended so far, in append order.
    pub fn take(&self) -> Vec<FetchResult> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<FetchResult>> {
        self.results.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use sweep_core::Outcome;

    use super::*;

    #[test]
    fn claims_each_task_once_in_order() {
        let queue = WorkQueue::new(vec![FetchTask::new("a"), FetchTask::new("b")]);
        assert_eq!(queue.remaining(), 2);
        assert_eq!(queue.claim().map(|(id, t)| (id, t.url().to_string())), Some((0, "a".into())));
        assert_eq!(queue.claim().map(|(id, t)| (id, t.url().to_string())), Some((1, "b".into())));
        assert!(queue.claim().is_none());
        assert!(queue.claim().is_none());
        assert_eq!(queue.remaining(), 0);
    }

    #[test]
    fn released_claims_count_as_remaining() {
        let queue = WorkQueue::new(vec![FetchTask::new("a"), FetchTask::new("b")]);
        assert!(queue.claim().is_some());
        queue.release();
        assert_eq!(queue.remaining(), 2);
        assert_eq!(queue.claim().map(|(id, _)| id), Some(1));
        assert_eq!(queue.remaining(), 1);
    }

    #[test]
    fn concurrent_claims_and_appends_lose_nothing() {
        let tasks = (0..500).map(|i| FetchTask::new(format!("u{i}"))).collect();
        let queue = Arc::new(WorkQueue::new(tasks));
        let log = Arc::new(ResultLog::default());

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let queue = queue.clone();
                let log = log.clone();
                thread::spawn(move || {
                    while let Some((task_id, task)) = queue.claim() {
                        log.push(FetchResult {
                            task_id,
                            url: task.url().to_string(),
                            outcome: Outcome::Success,
                            status: Some(200),
                            message: None,
                            elapsed: Duration::ZERO,
                            bytes: 0,
                            attempts: 1,
                            worker,
                        });
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(log.len(), 500);
        let mut ids: Vec<_> = log.take().into_iter().map(|r| r.task_id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..500).collect::<Vec<_>>());
    }
}
