//! Collaborator contracts with the transcription backend.
//!
//! The engine only talks to the backend through [`TranscriptionApi`]; the
//! HTTP implementation lives in [`http`], tests substitute their own.

pub mod http;
pub mod types;

use async_trait::async_trait;

use crate::annotator::KeywordConfig;
use crate::error::ApiError;
use crate::history::{HistoryRecord, HistoryScope};
use crate::jobs::UploadProgress;

pub use http::HttpTranscriptionApi;
pub use types::{
    AnalysisRule, HistoryPage, HistoryResponse, PollResponse, RemoteStatus, SubmitResponse,
    TranscriptResult, UploadOptions, UploadPayload,
};

#[async_trait]
pub trait TranscriptionApi: Send + Sync {
    /// Uploads one file, reporting transfer progress into `progress`.
    async fn submit(
        &self,
        payload: &UploadPayload,
        options: UploadOptions,
        progress: &UploadProgress,
    ) -> Result<SubmitResponse, ApiError>;

    async fn poll(&self, job_id: &str) -> Result<PollResponse, ApiError>;

    async fn fetch_history(&self, scope: HistoryScope) -> Result<Vec<HistoryRecord>, ApiError>;

    async fn fetch_keywords(&self) -> Result<KeywordConfig, ApiError>;

    async fn update_keywords(&self, config: &KeywordConfig) -> Result<(), ApiError>;

    async fn fetch_transcript(&self, job_id: &str) -> Result<TranscriptResult, ApiError>;

    async fn rename(&self, job_id: &str, new_name: &str) -> Result<(), ApiError>;

    async fn update_analysis_status(&self, job_id: &str, status: &str) -> Result<(), ApiError>;

    async fn delete(&self, job_id: &str) -> Result<(), ApiError>;

    /// Plain-text transcript download.
    async fn download_text(&self, job_id: &str) -> Result<String, ApiError>;
}
