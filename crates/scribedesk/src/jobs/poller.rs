//! Per-job status polling.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use super::model::{JobStatus, JobUpdate};
use super::registry::JobRegistry;
use crate::api::{PollResponse, RemoteStatus, TranscriptionApi};

/// Error shown when the server reports a failure without a message.
const UNKNOWN_FAILURE: &str = "Transcription failed";

/// State machine for one job's status checks.
///
/// Applies server responses in arrival order: progress is clamped to
/// `0..=100` and never decreases, and nothing moves a job out of a terminal
/// status.
#[derive(Debug, Clone)]
pub struct PollTracker {
    status: JobStatus,
    progress: u8,
    error: Option<String>,
    attempts: u32,
    max_attempts: u32,
}

impl PollTracker {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            status: JobStatus::Queued,
            progress: 0,
            error: None,
            attempts: 0,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// True once every allowed status check has been spent.
    pub fn exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    pub fn record_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }

    /// Applies one server response. Returns whether anything visible changed.
    pub fn apply(&mut self, response: &PollResponse) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        let before = (self.status, self.progress);

        match response.status {
            RemoteStatus::Queued | RemoteStatus::Processing => {
                self.status = if response.status == RemoteStatus::Queued {
                    JobStatus::Queued
                } else {
                    JobStatus::Processing
                };
                if let Some(raw) = response.progress {
                    self.progress = clamp_progress(raw, self.progress);
                }
            }
            RemoteStatus::Completed => {
                self.status = JobStatus::Completed;
                self.progress = 100;
            }
            RemoteStatus::Failed => {
                self.status = JobStatus::Failed;
                let message = response
                    .error
                    .as_deref()
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .unwrap_or(UNKNOWN_FAILURE);
                self.error = Some(message.to_string());
                return true;
            }
        }

        before != (self.status, self.progress)
    }

    /// Ends tracking after the ceiling is hit without a terminal status.
    pub fn time_out(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::TimedOut;
        self.error = Some(format!(
            "Timed out after {} status checks without a result",
            self.attempts
        ));
    }

    pub(crate) fn snapshot(&self) -> JobUpdate {
        JobUpdate {
            status: self.status,
            progress: self.progress,
            error: self.error.clone(),
        }
    }
}

/// Rounds and clamps a raw server value to `last..=100`.
fn clamp_progress(raw: f64, last: u8) -> u8 {
    if !raw.is_finite() {
        return last;
    }
    let value = raw.round().clamp(0.0, 100.0) as u8;
    value.max(last)
}

/// Drives one job from its first status check to a terminal status.
pub(crate) struct JobPoller {
    job_id: String,
    seq: u64,
    api: Arc<dyn TranscriptionApi>,
    registry: JobRegistry,
    tracker: PollTracker,
    interval: Duration,
    eviction_delay: Duration,
    token: CancellationToken,
}

impl JobPoller {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        job_id: &str,
        seq: u64,
        api: Arc<dyn TranscriptionApi>,
        registry: JobRegistry,
        max_attempts: u32,
        interval: Duration,
        eviction_delay: Duration,
        token: CancellationToken,
    ) -> Self {
        Self {
            job_id: job_id.to_string(),
            seq,
            api,
            registry,
            tracker: PollTracker::new(max_attempts),
            interval,
            eviction_delay,
            token,
        }
    }

    pub(crate) async fn run(mut self) {
        let span = info_span!("poll", job_id = %self.job_id);
        async move {
            loop {
                if self.tracker.exhausted() {
                    self.tracker.time_out();
                    warn!(attempts = self.tracker.attempts(), "Giving up on job");
                    self.push();
                    return;
                }

                self.tracker.record_attempt();
                let result = tokio::select! {
                    biased;
                    _ = self.token.cancelled() => return,
                    result = self.api.poll(&self.job_id) => result,
                };
                if self.token.is_cancelled() {
                    return;
                }

                match result {
                    Ok(response) => {
                        if self.tracker.apply(&response) && !self.push() {
                            return;
                        }
                    }
                    Err(e) if e.is_transient() => {
                        debug!(attempt = self.tracker.attempts(), "Status check failed: {}", e);
                    }
                    Err(e) => {
                        warn!(attempt = self.tracker.attempts(), "Status check rejected: {}", e);
                    }
                }

                match self.tracker.status() {
                    JobStatus::Completed => {
                        info!("Job completed");
                        self.evict_after_delay().await;
                        return;
                    }
                    status if status.is_terminal() => {
                        info!(error = ?self.tracker.error(), "Job ended with {}", status);
                        return;
                    }
                    _ => {}
                }

                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => return,
                    _ = tokio::time::sleep(self.interval) => {}
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Returns false when the job is no longer tracked.
    fn push(&self) -> bool {
        self.registry
            .apply_update(&self.job_id, self.seq, self.tracker.snapshot())
    }

    async fn evict_after_delay(&self) {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => return,
            _ = tokio::time::sleep(self.eviction_delay) => {}
        }
        self.registry.evict_completed(&self.job_id, self.seq);
    }
}
