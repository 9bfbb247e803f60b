//! Background job coordination
//!
//! Each submitted batch gets its own `JobId`, progress record and result
//! slot. Batches run one at a time: a single-permit semaphore gates the
//! workers, so a later submission stays in `starting` until the earlier one
//! has published its result.

use crate::config::Config;
use crate::job::envelope::{JobAccepted, ResultEnvelope, ResultPoll};
use crate::job::pipeline::Pipeline;
use crate::job::state::{JobId, JobState, JobStatus};
use crate::output::{CsvSink, RecordSink};
use crate::product::ProductRecord;
use crate::{HarvestError, InputError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, Semaphore};
use tokio::task::JoinHandle;

/// Poll interval for a `wait` call that lost the join handle to another waiter
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(25);

struct JobEntry {
    state: JobState,
    result: Option<ResultEnvelope>,
    handle: Option<JoinHandle<()>>,
}

impl JobEntry {
    fn new(total: usize) -> Self {
        Self {
            state: JobState::starting(total),
            result: None,
            handle: None,
        }
    }
}

type JobTable = Arc<RwLock<HashMap<JobId, JobEntry>>>;

/// State shared between the manager and its background tasks
#[derive(Clone)]
struct Worker {
    jobs: JobTable,
    pipeline: Arc<Pipeline>,
    sink: Arc<dyn RecordSink>,
}

impl Worker {
    /// Applies a status change, refusing and logging illegal transitions
    async fn set_status(&self, id: JobId, status: JobStatus) -> bool {
        let mut jobs = self.jobs.write().await;
        let Some(entry) = jobs.get_mut(&id) else {
            return false;
        };

        match entry.state.advance(status) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Job {}: {}", id, e);
                false
            }
        }
    }

    async fn record_attempt(&self, id: JobId) {
        if let Some(entry) = self.jobs.write().await.get_mut(&id) {
            entry.state.record_attempt();
        }
    }

    /// Moves the job to a terminal status and stores its envelope in one step
    ///
    /// A job that already published keeps its first envelope.
    async fn publish(&self, id: JobId, status: JobStatus, envelope: ResultEnvelope) {
        let mut jobs = self.jobs.write().await;
        let Some(entry) = jobs.get_mut(&id) else {
            return;
        };

        if let Err(e) = entry.state.advance(status) {
            tracing::warn!("Job {}: result not published: {}", id, e);
            return;
        }
        entry.result = Some(envelope);
        tracing::info!("Job {} finished with status {}", id, status);
    }

    /// Waits for the worker slot, then processes the batch
    ///
    /// The batch runs in its own task so that a panic inside it still ends
    /// the job in `error`.
    async fn run(self, id: JobId, urls: Vec<String>, slots: Arc<Semaphore>) {
        let _permit = match slots.acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                self.publish(id, JobStatus::Error, ResultEnvelope::failure("Job queue is closed"))
                    .await;
                return;
            }
        };

        let batch = tokio::spawn(self.clone().process(id, urls));
        if let Err(e) = batch.await {
            tracing::error!("Job {} worker failed: {}", id, e);
            self.publish(
                id,
                JobStatus::Error,
                ResultEnvelope::failure(format!("Job worker failed: {}", e)),
            )
            .await;
        }
    }

    /// Fetches every URL in order, then hands the records to the sink
    async fn process(self, id: JobId, urls: Vec<String>) {
        self.set_status(id, JobStatus::Processing).await;
        let total = urls.len();
        tracing::info!("Job {}: processing {} URLs", id, total);

        let mut records = Vec::with_capacity(total);
        for (index, url) in urls.iter().enumerate() {
            self.record_attempt(id).await;
            tracing::info!("Parsing URL {}/{}: {}", index + 1, total, url);

            match self.pipeline.harvest(url).await {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping {}: {}", url, e),
            }
        }

        let (status, envelope) = self.conclude(records, total).await;
        self.publish(id, status, envelope).await;
    }

    async fn conclude(
        &self,
        records: Vec<ProductRecord>,
        attempted: usize,
    ) -> (JobStatus, ResultEnvelope) {
        if records.is_empty() {
            tracing::warn!("No products parsed out of {} URLs", attempted);
            return (
                JobStatus::Error,
                ResultEnvelope::failure(HarvestError::BatchExhausted.to_string()),
            );
        }

        let count = records.len();
        let sink = Arc::clone(&self.sink);
        match tokio::task::spawn_blocking(move || sink.write(&records)).await {
            Ok(Ok(path)) => (
                JobStatus::Completed,
                ResultEnvelope::success(&path, count, attempted),
            ),
            Ok(Err(e)) => {
                tracing::error!("Failed to write {} records: {}", count, e);
                (JobStatus::Error, ResultEnvelope::failure(e.to_string()))
            }
            Err(e) => (
                JobStatus::Error,
                ResultEnvelope::failure(format!("Job worker failed: {}", e)),
            ),
        }
    }
}

/// Accepts batches and answers progress and result queries by job id
pub struct JobManager {
    worker: Worker,
    slots: Arc<Semaphore>,
}

impl JobManager {
    /// Creates a manager around a pipeline and a record sink
    pub fn new(pipeline: Pipeline, sink: Arc<dyn RecordSink>) -> Self {
        Self {
            worker: Worker {
                jobs: Arc::new(RwLock::new(HashMap::new())),
                pipeline: Arc::new(pipeline),
                sink,
            },
            slots: Arc::new(Semaphore::new(1)),
        }
    }

    /// Creates a manager writing CSV files as configured
    ///
    /// # Returns
    ///
    /// * `Ok(JobManager)` - HTTP client and selectors are ready
    /// * `Err(HarvestError)` - The client could not be built or a selector failed to compile
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        let pipeline = Pipeline::from_config(config)?;
        let sink = Arc::new(CsvSink::from_config(&config.output));
        Ok(Self::new(pipeline, sink))
    }

    /// Starts a batch in the background and returns immediately
    ///
    /// Blank entries are dropped. Must be called from within a Tokio runtime.
    ///
    /// # Returns
    ///
    /// * `Ok(JobAccepted)` - The job id and URL count
    /// * `Err(InputError::NoUrls)` - Nothing to process; no job was created
    pub async fn submit(&self, urls: Vec<String>) -> Result<JobAccepted, InputError> {
        let urls: Vec<String> = urls
            .into_iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();
        if urls.is_empty() {
            return Err(InputError::NoUrls);
        }

        let id = JobId::new();
        let total = urls.len();

        // Register before spawning so the task always finds its entry
        self.worker.jobs.write().await.insert(id, JobEntry::new(total));

        let handle = tokio::spawn(self.worker.clone().run(id, urls, Arc::clone(&self.slots)));
        if let Some(entry) = self.worker.jobs.write().await.get_mut(&id) {
            entry.handle = Some(handle);
        }

        let accepted = JobAccepted::new(id, total);
        tracing::info!("Job {} accepted: {}", id, accepted.message);
        Ok(accepted)
    }

    /// Returns a snapshot of the job's progress
    pub async fn progress(&self, id: JobId) -> Result<JobState, HarvestError> {
        self.worker
            .jobs
            .read()
            .await
            .get(&id)
            .map(|entry| entry.state)
            .ok_or(HarvestError::UnknownJob(id))
    }

    /// Returns the job's envelope, or `Pending` if it has not finished
    ///
    /// Reading does not consume the envelope.
    pub async fn result(&self, id: JobId) -> Result<ResultPoll, HarvestError> {
        let jobs = self.worker.jobs.read().await;
        let entry = jobs.get(&id).ok_or(HarvestError::UnknownJob(id))?;

        Ok(match &entry.result {
            Some(envelope) => ResultPoll::Ready(envelope.clone()),
            None => ResultPoll::Pending,
        })
    }

    pub async fn is_finished(&self, id: JobId) -> Result<bool, HarvestError> {
        Ok(self.progress(id).await?.is_terminal())
    }

    /// Waits for the job to publish its envelope
    pub async fn wait(&self, id: JobId) -> Result<ResultEnvelope, HarvestError> {
        let handle = {
            let mut jobs = self.worker.jobs.write().await;
            let entry = jobs.get_mut(&id).ok_or(HarvestError::UnknownJob(id))?;
            entry.handle.take()
        };

        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!("Job {} task failed: {}", id, e);
                self.worker
                    .publish(
                        id,
                        JobStatus::Error,
                        ResultEnvelope::failure(format!("Job worker failed: {}", e)),
                    )
                    .await;
            }
        }

        loop {
            match self.result(id).await? {
                ResultPoll::Ready(envelope) => return Ok(envelope),
                ResultPoll::Pending => tokio::time::sleep(WAIT_POLL_INTERVAL).await,
            }
        }
    }

    /// Drops a finished job and returns its envelope
    ///
    /// # Returns
    ///
    /// * `Ok(ResultEnvelope)` - The job was terminal and is forgotten
    /// * `Err(HarvestError::JobActive)` - The job has not published yet; nothing is removed
    /// * `Err(HarvestError::UnknownJob)` - No such job
    pub async fn remove(&self, id: JobId) -> Result<ResultEnvelope, HarvestError> {
        let mut jobs = self.worker.jobs.write().await;
        let entry = jobs.get(&id).ok_or(HarvestError::UnknownJob(id))?;
        if entry.result.is_none() {
            return Err(HarvestError::JobActive(id));
        }

        let entry = jobs.remove(&id).ok_or(HarvestError::UnknownJob(id))?;
        tracing::debug!("Job {} removed", id);
        entry.result.ok_or(HarvestError::JobActive(id))
    }

    /// Ids of every job submitted to this manager
    pub async fn job_ids(&self) -> Vec<JobId> {
        self.worker.jobs.read().await.keys().copied().collect()
    }
}
