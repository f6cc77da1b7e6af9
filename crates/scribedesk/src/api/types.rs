//! Wire shapes exchanged with the transcription backend.

use serde::{Deserialize, Serialize};

use crate::history::HistoryRecord;

/// One file to upload.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadPayload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Reads a file from disk, keeping only its file name for display.
    pub fn from_path(path: &std::path::Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio")
            .to_string();
        Ok(Self { filename, bytes })
    }
}

/// Transcription options sent with an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOptions {
    /// Ask for `[MM:SS]` markers on transcript lines.
    pub timestamps: bool,
    /// Ask for speaker separation.
    pub diarization: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            timestamps: true,
            diarization: true,
        }
    }
}

/// Response of an accepted upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub task_id: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status_url: Option<String>,
}

/// Status as reported by the backend's status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteStatus {
    #[serde(alias = "pending")]
    Queued,
    Processing,
    Completed,
    Failed,
}

/// Response of one status poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollResponse {
    pub status: RemoteStatus,
    /// Raw progress; may be fractional, out of range or out of order.
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl PollResponse {
    pub fn new(status: RemoteStatus, progress: Option<f64>) -> Self {
        Self {
            status,
            progress,
            error: None,
        }
    }

    pub fn failed(error: &str) -> Self {
        Self {
            status: RemoteStatus::Failed,
            progress: None,
            error: Some(error.to_string()),
        }
    }
}

/// Paginated history listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPage {
    pub tasks: Vec<HistoryRecord>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub has_more: bool,
}

/// Older servers return a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HistoryResponse {
    Page(HistoryPage),
    List(Vec<HistoryRecord>),
}

impl HistoryResponse {
    pub fn into_records(self) -> Vec<HistoryRecord> {
        match self {
            HistoryResponse::Page(page) => page.tasks,
            HistoryResponse::List(records) => records,
        }
    }
}

/// A finished transcription as returned by the result endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptResult {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub topics: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub processing_time: Option<f64>,
    #[serde(default)]
    pub analysis_status: Option<String>,
}

/// An administrator-defined analysis rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRule {
    #[serde(default)]
    pub name: Option<String>,
    pub category: String,
    /// Comma separated terms.
    pub keywords: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}
