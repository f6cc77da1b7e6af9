//! Scripted in-memory backend.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use scribedesk::annotator::KeywordConfig;
use scribedesk::api::{
    PollResponse, RemoteStatus, SubmitResponse, TranscriptResult, TranscriptionApi,
    UploadOptions, UploadPayload,
};
use scribedesk::history::{HistoryRecord, HistoryScope};
use scribedesk::jobs::UploadProgress;
use scribedesk::ApiError;

/// One scripted answer to a status check.
#[derive(Debug, Clone)]
pub enum PollStep {
    Respond(PollResponse),
    /// Fails like a dropped connection.
    NetworkError,
    /// Answers only after the given (tokio) time has passed.
    Delayed(Duration, PollResponse),
}

impl PollStep {
    pub fn queued() -> Self {
        PollStep::Respond(PollResponse::new(RemoteStatus::Queued, Some(0.0)))
    }

    pub fn processing(progress: f64) -> Self {
        PollStep::Respond(PollResponse::new(RemoteStatus::Processing, Some(progress)))
    }

    pub fn completed() -> Self {
        PollStep::Respond(PollResponse::new(RemoteStatus::Completed, Some(100.0)))
    }

    pub fn failed(error: &str) -> Self {
        PollStep::Respond(PollResponse::failed(error))
    }
}

#[derive(Default)]
struct MockState {
    next_ids: VecDeque<String>,
    issued: usize,
    rejections: HashMap<String, (u16, String)>,
    scripts: HashMap<String, VecDeque<PollStep>>,
    /// Last response given per job; repeated once the script runs out.
    last: HashMap<String, PollResponse>,
    poll_counts: HashMap<String, usize>,
    submitted: Vec<(String, UploadOptions)>,
    history: Vec<HistoryRecord>,
    history_scopes: Vec<HistoryScope>,
    keywords: KeywordConfig,
    transcripts: HashMap<String, TranscriptResult>,
    renames: Vec<(String, String)>,
    deleted: Vec<String>,
}

#[derive(Default)]
pub struct MockApi {
    state: Mutex<MockState>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Ids handed out to uploads, in order.
    pub fn with_job_ids(self, ids: &[&str]) -> Self {
        self.state()
            .next_ids
            .extend(ids.iter().map(|id| id.to_string()));
        self
    }

    pub fn with_script(self, job_id: &str, steps: Vec<PollStep>) -> Self {
        self.state()
            .scripts
            .insert(job_id.to_string(), steps.into_iter().collect());
        self
    }

    pub fn rejecting(self, filename: &str, status: u16, detail: &str) -> Self {
        self.state()
            .rejections
            .insert(filename.to_string(), (status, detail.to_string()));
        self
    }

    pub fn with_history(self, records: Vec<HistoryRecord>) -> Self {
        self.state().history = records;
        self
    }

    pub fn with_keywords(self, keywords: KeywordConfig) -> Self {
        self.state().keywords = keywords;
        self
    }

    pub fn with_transcript(self, job_id: &str, result: TranscriptResult) -> Self {
        self.state()
            .transcripts
            .insert(job_id.to_string(), result);
        self
    }

    pub fn poll_count(&self, job_id: &str) -> usize {
        self.state().poll_counts.get(job_id).copied().unwrap_or(0)
    }

    pub fn submitted(&self) -> Vec<(String, UploadOptions)> {
        self.state().submitted.clone()
    }

    pub fn history_scopes(&self) -> Vec<HistoryScope> {
        self.state().history_scopes.clone()
    }

    pub fn renames(&self) -> Vec<(String, String)> {
        self.state().renames.clone()
    }
}

#[async_trait]
impl TranscriptionApi for MockApi {
    async fn submit(
        &self,
        payload: &UploadPayload,
        options: UploadOptions,
        progress: &UploadProgress,
    ) -> Result<SubmitResponse, ApiError> {
        let total = payload.bytes.len() as u64;
        progress.report(total / 2, total);
        progress.report(total, total);

        let mut state = self.state();
        if let Some((status, detail)) = state.rejections.get(&payload.filename).cloned() {
            return Err(ApiError::Status { status, detail });
        }
        state.issued += 1;
        let task_id = match state.next_ids.pop_front() {
            Some(id) => id,
            None => format!("task-{}", state.issued),
        };
        state
            .submitted
            .push((payload.filename.clone(), options));
        Ok(SubmitResponse {
            task_id,
            message: Some("Arquivo recebido".to_string()),
            status_url: None,
        })
    }

    async fn poll(&self, job_id: &str) -> Result<PollResponse, ApiError> {
        let step = {
            let mut state = self.state();
            *state.poll_counts.entry(job_id.to_string()).or_default() += 1;
            let next = state.scripts.get_mut(job_id).and_then(|s| s.pop_front());
            match next {
                Some(step) => step,
                None => PollStep::Respond(
                    state
                        .last
                        .get(job_id)
                        .cloned()
                        .unwrap_or_else(|| PollResponse::new(RemoteStatus::Queued, None)),
                ),
            }
        };

        let response = match step {
            PollStep::Respond(response) => response,
            PollStep::NetworkError => return Err(ApiError::Decode("connection reset".to_string())),
            PollStep::Delayed(delay, response) => {
                tokio::time::sleep(delay).await;
                response
            }
        };
        self.state()
            .last
            .insert(job_id.to_string(), response.clone());
        Ok(response)
    }

    async fn fetch_history(&self, scope: HistoryScope) -> Result<Vec<HistoryRecord>, ApiError> {
        let mut state = self.state();
        state.history_scopes.push(scope);
        Ok(state.history.clone())
    }

    async fn fetch_keywords(&self) -> Result<KeywordConfig, ApiError> {
        Ok(self.state().keywords.clone())
    }

    async fn update_keywords(&self, config: &KeywordConfig) -> Result<(), ApiError> {
        self.state().keywords = config.clone();
        Ok(())
    }

    async fn fetch_transcript(&self, job_id: &str) -> Result<TranscriptResult, ApiError> {
        self.state()
            .transcripts
            .get(job_id)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                detail: "Tarefa não encontrada".to_string(),
            })
    }

    async fn rename(&self, job_id: &str, new_name: &str) -> Result<(), ApiError> {
        self.state()
            .renames
            .push((job_id.to_string(), new_name.to_string()));
        Ok(())
    }

    async fn update_analysis_status(&self, job_id: &str, status: &str) -> Result<(), ApiError> {
        let mut state = self.state();
        if let Some(record) = state.history.iter_mut().find(|r| r.task_id == job_id) {
            record.analysis_status = status.to_string();
        }
        Ok(())
    }

    async fn delete(&self, job_id: &str) -> Result<(), ApiError> {
        let mut state = self.state();
        state.history.retain(|r| r.task_id != job_id);
        state.deleted.push(job_id.to_string());
        Ok(())
    }

    async fn download_text(&self, job_id: &str) -> Result<String, ApiError> {
        Ok(self
            .state()
            .transcripts
            .get(job_id)
            .and_then(|t| t.text.clone())
            .unwrap_or_default())
    }
}
