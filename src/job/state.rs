/// Job state definitions for tracking batch progress
///
/// This module defines the lifecycle of a submitted batch and the progress
/// snapshot exposed to pollers.
use crate::HarvestError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier handed out on submission and used for every later query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of one batch
///
/// `Idle → Starting → Processing → {Completed | Error}`; a status never
/// moves backwards and the two terminal statuses are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// No batch has been submitted
    Idle,

    /// Accepted and waiting for the worker
    Starting,

    /// URLs are being fetched and parsed
    Processing,

    // ===== Terminal States =====
    /// At least one record was written by the sink
    Completed,

    /// No records, or the sink failed
    Error,
}

impl JobStatus {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Returns true if the move from `self` to `next` keeps the lifecycle forward-only
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Idle, Starting)
                | (Idle, Processing)
                | (Starting, Processing)
                | (Starting, Error)
                | (Processing, Completed)
                | (Processing, Error)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress snapshot of one batch
///
/// `current` counts URLs attempted, not URLs that succeeded, and never
/// exceeds `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobState {
    pub total: usize,
    pub current: usize,
    pub status: JobStatus,
}

impl JobState {
    /// The state before any batch exists
    pub fn idle() -> Self {
        Self {
            total: 0,
            current: 0,
            status: JobStatus::Idle,
        }
    }

    /// The state of a freshly accepted batch
    pub fn starting(total: usize) -> Self {
        Self {
            total,
            current: 0,
            status: JobStatus::Starting,
        }
    }

    /// Moves to `next`, refusing any backwards or post-terminal move
    pub fn advance(&mut self, next: JobStatus) -> Result<(), HarvestError> {
        if !self.status.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Counts one more attempted URL, saturating at `total`
    pub fn record_attempt(&mut self) {
        if self.current < self.total {
            self.current += 1;
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

impl Default for JobState {
    fn default() -> Self {
        Self::idle()
    }
}
