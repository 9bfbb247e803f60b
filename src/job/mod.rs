//! Batch jobs: submission, progress, and terminal results

mod envelope;
mod manager;
mod pipeline;
mod state;

pub use envelope::{JobAccepted, ResultEnvelope, ResultPoll};
pub use manager::JobManager;
pub use pipeline::Pipeline;
pub use state::{JobId, JobState, JobStatus};
