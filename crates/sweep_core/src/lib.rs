//! Sweep core: pure fetch model, retry state machine and run accounting.
mod effect;
mod msg;
mod outcome;
mod policy;
mod result;
mod state;
mod summary;
mod task;
mod update;

pub mod serde_duration;

pub use effect::TaskEffect;
pub use msg::TaskMsg;
pub use outcome::Outcome;
pub use policy::RetryPolicy;
pub use result::FetchResult;
pub use state::TaskState;
pub use summary::RunSummary;
pub use task::{FetchTask, TaskId};
pub use update::update;
