use crate::job::state::JobId;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::path::Path;

/// Terminal outcome of one batch
///
/// Exactly one envelope is published per job. Reading it does not consume it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEnvelope {
    pub success: bool,
    /// Output file on success, error message on failure
    pub filename_or_error: String,
    /// Records written
    pub count: usize,
    /// URLs attempted
    pub total_processed: usize,
}

impl ResultEnvelope {
    pub fn success(filename: &Path, count: usize, total_processed: usize) -> Self {
        Self {
            success: true,
            filename_or_error: filename.display().to_string(),
            count,
            total_processed,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            filename_or_error: error.into(),
            count: 0,
            total_processed: 0,
        }
    }

    pub fn filename(&self) -> Option<&str> {
        self.success.then_some(self.filename_or_error.as_str())
    }

    pub fn error(&self) -> Option<&str> {
        (!self.success).then_some(self.filename_or_error.as_str())
    }
}

impl Serialize for ResultEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.success {
            let mut map = serializer.serialize_map(Some(4))?;
            map.serialize_entry("success", &true)?;
            map.serialize_entry("filename", &self.filename_or_error)?;
            map.serialize_entry("count", &self.count)?;
            map.serialize_entry("total_processed", &self.total_processed)?;
            map.end()
        } else {
            let mut map = serializer.serialize_map(Some(2))?;
            map.serialize_entry("success", &false)?;
            map.serialize_entry("error", &self.filename_or_error)?;
            map.end()
        }
    }
}

/// Answer to a result query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultPoll {
    Ready(ResultEnvelope),
    /// The job has not published its envelope yet
    Pending,
}

impl ResultPoll {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn envelope(&self) -> Option<&ResultEnvelope> {
        match self {
            Self::Ready(envelope) => Some(envelope),
            Self::Pending => None,
        }
    }
}

impl Serialize for ResultPoll {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Ready(envelope) => envelope.serialize(serializer),
            Self::Pending => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("status", "waiting")?;
                map.end()
            }
        }
    }
}

/// Synchronous answer to a successful submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobAccepted {
    pub job_id: JobId,
    pub total: usize,
    pub message: String,
}

impl JobAccepted {
    pub fn new(job_id: JobId, total: usize) -> Self {
        Self {
            job_id,
            total,
            message: format!("Starting to parse {} URLs", total),
        }
    }
}

impl Serialize for JobAccepted {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("status", "started")?;
        map.serialize_entry("job_id", &self.job_id)?;
        map.serialize_entry("total", &self.total)?;
        map.serialize_entry("message", &self.message)?;
        map.end()
    }
}
