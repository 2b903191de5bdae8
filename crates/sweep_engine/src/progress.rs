use std::sync::mpsc;
use std::time::Duration;

use sweep_core::{FetchResult, Outcome, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolEvent {
    TaskStarted {
        task_id: TaskId,
        worker: usize,
    },
    AttemptFailed {
        task_id: TaskId,
        attempt: u32,
        outcome: Outcome,
    },
    RetryScheduled {
        task_id: TaskId,
        attempt: u32,
        delay: Duration,
    },
    TaskFinished(FetchResult),
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: PoolEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<PoolEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<PoolEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: PoolEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: PoolEvent) {}
}
