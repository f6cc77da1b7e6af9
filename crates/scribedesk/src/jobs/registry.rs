//! Keyed collection of the jobs currently tracked by the client.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::model::{Job, JobCounts, JobStatus, JobUpdate};
use super::poller::JobPoller;
use super::upload::UploadTask;
use crate::api::TranscriptionApi;
use crate::broadcast::{JobEvent, JobEventBroadcaster, RemovalReason};
use crate::config::{EngineConfig, PollingConfig};
use crate::error::{RegistryError, SubmissionError};
use crate::history::{HistoryRecord, HistoryStatus};

struct Entry {
    job: Job,
    /// Insertion order; breaks ties between equal submission times.
    seq: u64,
    token: CancellationToken,
}

#[derive(Default)]
struct RegistryState {
    entries: HashMap<String, Entry>,
    next_seq: u64,
}

struct RegistryInner {
    api: Arc<dyn TranscriptionApi>,
    polling: PollingConfig,
    state: RwLock<RegistryState>,
    events: JobEventBroadcaster,
}

/// Tracks in-flight and recently finished jobs.
///
/// Each tracked job owns exactly one poller. Cloning is cheap and every clone
/// sees the same jobs.
#[derive(Clone)]
pub struct JobRegistry {
    inner: Arc<RegistryInner>,
}

impl JobRegistry {
    pub fn new(api: Arc<dyn TranscriptionApi>, polling: PollingConfig, capacity: usize) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                api,
                polling,
                state: RwLock::new(RegistryState::default()),
                events: JobEventBroadcaster::new(capacity),
            }),
        }
    }

    pub fn from_config(api: Arc<dyn TranscriptionApi>, config: &EngineConfig) -> Self {
        Self::new(api, config.polling.clone(), config.events.capacity)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, RegistryState> {
        match self.inner.state.read() {
            Ok(g) => g,
            Err(poisoned) => {
                log::warn!("Job registry lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, RegistryState> {
        match self.inner.state.write() {
            Ok(g) => g,
            Err(poisoned) => {
                log::warn!("Job registry lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Uploads a file and starts tracking the job the server creates.
    ///
    /// A rejected upload never enters the registry.
    pub async fn submit(&self, task: UploadTask) -> Result<String, SubmissionError> {
        let accepted = task.run(self.inner.api.as_ref()).await?;
        if let Err(e) = self.track(&accepted.job_id, &accepted.filename) {
            log::warn!("Accepted upload not tracked: {}", e);
        }
        Ok(accepted.job_id)
    }

    /// Starts tracking a job that already exists on the server.
    ///
    /// Must be called from within a tokio runtime.
    pub fn track(&self, job_id: &str, filename: &str) -> Result<(), RegistryError> {
        let token = CancellationToken::new();
        let (job, seq) = {
            let mut state = self.write_state();
            if state.entries.contains_key(job_id) {
                return Err(RegistryError::DuplicateJob(job_id.to_string()));
            }
            let seq = state.next_seq;
            state.next_seq += 1;
            let job = Job::queued(job_id, filename);
            state.entries.insert(
                job_id.to_string(),
                Entry {
                    job: job.clone(),
                    seq,
                    token: token.clone(),
                },
            );
            (job, seq)
        };

        log::debug!("Tracking job {} ({})", job_id, filename);
        self.inner.events.send(JobEvent::inserted(&job));

        let polling = &self.inner.polling;
        let poller = JobPoller::new(
            job_id,
            seq,
            Arc::clone(&self.inner.api),
            self.clone(),
            polling.max_attempts,
            polling.interval(),
            polling.eviction_delay(),
            token,
        );
        tokio::spawn(poller.run());
        Ok(())
    }

    /// All tracked jobs, newest submission first.
    pub fn list(&self) -> Vec<Job> {
        let state = self.read_state();
        let mut entries: Vec<&Entry> = state.entries.values().collect();
        entries.sort_by(|a, b| {
            b.job
                .created_at
                .cmp(&a.job.created_at)
                .then_with(|| b.seq.cmp(&a.seq))
        });
        entries.into_iter().map(|e| e.job.clone()).collect()
    }

    pub fn get(&self, job_id: &str) -> Option<Job> {
        self.read_state().entries.get(job_id).map(|e| e.job.clone())
    }

    pub fn contains(&self, job_id: &str) -> bool {
        self.read_state().entries.contains_key(job_id)
    }

    pub fn is_empty(&self) -> bool {
        self.read_state().entries.is_empty()
    }

    /// Stops tracking a job. Any response still in flight is discarded.
    ///
    /// Returns false if the job was not tracked.
    pub fn cancel(&self, job_id: &str) -> bool {
        let removed = self.write_state().entries.remove(job_id);
        match removed {
            Some(entry) => {
                entry.token.cancel();
                log::info!("Cancelled tracking of job {}", job_id);
                self.inner
                    .events
                    .send(JobEvent::removed(job_id, RemovalReason::Cancelled));
                true
            }
            None => false,
        }
    }

    /// Removes a failed or timed-out job. Running or completed jobs stay.
    ///
    /// Returns whether the job was removed.
    pub fn dismiss(&self, job_id: &str) -> Result<bool, RegistryError> {
        let removed = {
            let mut state = self.write_state();
            match state.entries.get(job_id).map(|e| e.job.status) {
                None => return Err(RegistryError::NotFound(job_id.to_string())),
                Some(status) if !status.is_failure() => return Ok(false),
                Some(_) => state.entries.remove(job_id),
            }
        };
        if let Some(entry) = removed {
            entry.token.cancel();
            self.inner
                .events
                .send(JobEvent::removed(job_id, RemovalReason::Dismissed));
        }
        Ok(true)
    }

    /// Changes the display name of a tracked job.
    pub fn rename(&self, job_id: &str, filename: &str) -> Result<(), RegistryError> {
        let job = {
            let mut state = self.write_state();
            let entry = state
                .entries
                .get_mut(job_id)
                .ok_or_else(|| RegistryError::NotFound(job_id.to_string()))?;
            entry.job.filename = filename.to_string();
            entry.job.clone()
        };
        self.inner.events.send(JobEvent::updated(&job));
        Ok(())
    }

    /// Drops completed jobs the history listing already shows.
    ///
    /// Returns the ids removed.
    pub fn reconcile(&self, records: &[HistoryRecord]) -> Vec<String> {
        let finished: HashSet<&str> = records
            .iter()
            .filter(|r| r.status == HistoryStatus::Completed)
            .map(|r| r.task_id.as_str())
            .collect();

        let removed: Vec<Entry> = {
            let mut state = self.write_state();
            let ids: Vec<String> = state
                .entries
                .iter()
                .filter(|(id, e)| {
                    e.job.status == JobStatus::Completed && finished.contains(id.as_str())
                })
                .map(|(id, _)| id.clone())
                .collect();
            ids.iter()
                .filter_map(|id| state.entries.remove(id))
                .collect()
        };

        removed
            .into_iter()
            .map(|entry| {
                entry.token.cancel();
                self.inner
                    .events
                    .send(JobEvent::removed(&entry.job.id, RemovalReason::Reconciled));
                entry.job.id
            })
            .collect()
    }

    pub fn counts(&self) -> JobCounts {
        let state = self.read_state();
        let mut counts = JobCounts::default();
        for entry in state.entries.values() {
            match entry.job.status {
                JobStatus::Queued => counts.queued += 1,
                JobStatus::Processing => counts.processing += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed | JobStatus::TimedOut => counts.failed += 1,
            }
        }
        counts
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.inner.events.subscribe()
    }

    /// Calls `callback` for every registry change until the registry is dropped.
    pub fn on_change<F>(&self, mut callback: F) -> JoinHandle<()>
    where
        F: FnMut(JobEvent) + Send + 'static,
    {
        let mut rx = self.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => callback(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("Registry observer lagged, skipped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Applies a poller snapshot to the entry it was started for.
    ///
    /// Returns false when that entry is gone, telling the poller to stop.
    pub(crate) fn apply_update(&self, job_id: &str, seq: u64, update: JobUpdate) -> bool {
        let (job, previous) = {
            let mut state = self.write_state();
            let entry = match state.entries.get_mut(job_id) {
                Some(entry) if entry.seq == seq && !entry.token.is_cancelled() => entry,
                _ => return false,
            };
            if entry.job.status.is_terminal() {
                return false;
            }
            let previous = entry.job.apply(&update);
            (entry.job.clone(), previous)
        };

        self.inner.events.send(JobEvent::updated(&job));
        if previous != job.status {
            match job.status {
                JobStatus::Completed => self.inner.events.send(JobEvent::completed(&job)),
                JobStatus::Failed | JobStatus::TimedOut => {
                    self.inner.events.send(JobEvent::failed(&job))
                }
                _ => {}
            }
        }
        true
    }

    /// Removes a completed job once its eviction delay has passed.
    pub(crate) fn evict_completed(&self, job_id: &str, seq: u64) {
        let evicted = {
            let mut state = self.write_state();
            let owned = state
                .entries
                .get(job_id)
                .is_some_and(|e| e.seq == seq && e.job.status == JobStatus::Completed);
            owned && state.entries.remove(job_id).is_some()
        };
        if evicted {
            log::debug!("Evicted completed job {}", job_id);
            self.inner
                .events
                .send(JobEvent::removed(job_id, RemovalReason::Evicted));
        }
    }
}
