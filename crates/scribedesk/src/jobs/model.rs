use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::JobError;

/// Lifecycle status of a tracked job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    /// Poll ceiling reached without a terminal answer from the server.
    TimedOut,
}

impl JobStatus {
    /// No transition leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::TimedOut
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, JobStatus::Failed | JobStatus::TimedOut)
    }

    /// Progress reports are only taken while the job is still running.
    pub fn accepts_progress(&self) -> bool {
        matches!(self, JobStatus::Queued | JobStatus::Processing)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "Queued"),
            JobStatus::Processing => write!(f, "Processing"),
            JobStatus::Completed => write!(f, "Completed"),
            JobStatus::Failed => write!(f, "Failed"),
            JobStatus::TimedOut => write!(f, "Timed out"),
        }
    }
}

/// A transcription request being tracked by the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Backend-issued job identifier.
    pub id: String,
    /// Display name; can be renamed independently of the uploaded file.
    pub filename: String,
    pub status: JobStatus,
    /// 0–100, never decreasing while the job runs.
    pub progress: u8,
    /// Set only when `status` is a failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Client-side submission time.
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// A freshly accepted job.
    pub fn queued(id: &str, filename: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            filename: filename.to_string(),
            status: JobStatus::Queued,
            progress: 0,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn failure(&self) -> Option<JobError> {
        let message = self.error.clone().unwrap_or_default();
        match self.status {
            JobStatus::Failed => Some(JobError::Failed(message)),
            JobStatus::TimedOut => Some(JobError::TimedOut(message)),
            _ => None,
        }
    }

    /// Applies a poller snapshot. Returns the previous status.
    pub(crate) fn apply(&mut self, update: &JobUpdate) -> JobStatus {
        let previous = self.status;
        self.status = update.status;
        self.progress = update.progress;
        self.error = if update.status.is_failure() {
            update.error.clone()
        } else {
            None
        };
        self.updated_at = Utc::now();
        previous
    }
}

/// State pushed by a poller into the registry after a transition.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct JobUpdate {
    pub status: JobStatus,
    pub progress: u8,
    pub error: Option<String>,
}

/// Active/failed totals for status badges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobCounts {
    pub queued: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}
