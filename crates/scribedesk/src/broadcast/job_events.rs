//! Job lifecycle broadcaster for real-time registry updates.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::jobs::Job;

/// Why a job left the registry.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    /// Completed job dropped after the eviction delay.
    Evicted,
    /// The user cancelled tracking.
    Cancelled,
    /// A failed job acknowledged by the user.
    Dismissed,
    /// Completed job already present in the history listing.
    Reconciled,
}

/// A change to the registry.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobEvent {
    Inserted {
        job: Job,
        timestamp: DateTime<Utc>,
    },
    Updated {
        job: Job,
        timestamp: DateTime<Utc>,
    },
    /// User-facing completion notice. Sent once per job.
    Completed {
        job: Job,
        timestamp: DateTime<Utc>,
    },
    /// Failure or timeout. Sent once per job.
    Failed {
        job: Job,
        timestamp: DateTime<Utc>,
    },
    Removed {
        #[serde(rename = "jobId")]
        job_id: String,
        reason: RemovalReason,
        timestamp: DateTime<Utc>,
    },
}

impl JobEvent {
    pub fn inserted(job: &Job) -> Self {
        JobEvent::Inserted {
            job: job.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn updated(job: &Job) -> Self {
        JobEvent::Updated {
            job: job.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn completed(job: &Job) -> Self {
        JobEvent::Completed {
            job: job.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn failed(job: &Job) -> Self {
        JobEvent::Failed {
            job: job.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn removed(job_id: &str, reason: RemovalReason) -> Self {
        JobEvent::Removed {
            job_id: job_id.to_string(),
            reason,
            timestamp: Utc::now(),
        }
    }

    pub fn job_id(&self) -> &str {
        match self {
            JobEvent::Inserted { job, .. }
            | JobEvent::Updated { job, .. }
            | JobEvent::Completed { job, .. }
            | JobEvent::Failed { job, .. } => &job.id,
            JobEvent::Removed { job_id, .. } => job_id,
        }
    }
}

/// Broadcasts registry changes to any number of observers.
#[derive(Clone)]
pub struct JobEventBroadcaster {
    sender: Arc<broadcast::Sender<JobEvent>>,
}

impl JobEventBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn send(&self, event: JobEvent) {
        // No active receivers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for JobEventBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}
