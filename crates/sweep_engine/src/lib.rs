//! Sweep engine: network transport and the bounded-concurrency fetch pool.
mod pool;
mod progress;
mod queue;
mod transport;
mod types;

pub use pool::{FetchPool, PoolConfig, PoolError, RunReport};
pub use progress::{ChannelProgressSink, NullProgressSink, PoolEvent, ProgressSink};
pub use queue::{ResultLog, WorkQueue};
pub use transport::{ReqwestTransport, Transport, TransportSettings};
pub use types::{FailureKind, FetchError, FetchOutput, TransportError};

pub use sweep_core::{FetchResult, FetchTask, Outcome, RetryPolicy, RunSummary, TaskId};
pub use tokio_util::sync::CancellationToken;
