use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScribeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Failed to parse config YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

/// Failures talking to the transcription backend.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ApiError {
    /// True for failures worth retrying on the next poll tick.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport(_) | ApiError::Decode(_) => true,
            ApiError::Status { status, .. } => *status >= 500 || *status == 429,
            ApiError::InvalidUrl { .. } => false,
        }
    }
}

/// An upload that was never accepted; the job never enters the registry.
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("{detail}")]
    Rejected { status: u16, detail: String },

    #[error("Upload failed: {0}")]
    Transport(String),

    #[error("Upload response missing task id")]
    MissingJobId,
}

impl From<ApiError> for SubmissionError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, detail } => SubmissionError::Rejected { status, detail },
            other => SubmissionError::Transport(other.to_string()),
        }
    }
}

/// Why a tracked job ended unsuccessfully. Both persist until dismissed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// The server reported the job as failed.
    #[error("{0}")]
    Failed(String),

    /// The poll ceiling was reached without a terminal status.
    #[error("{0}")]
    TimedOut(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Job '{0}' is already tracked")]
    DuplicateJob(String),

    #[error("Job '{0}' not found")]
    NotFound(String),
}

/// A keyword set that could not be compiled; the set is skipped, annotation continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationConfigError {
    #[error("{category} term '{term}' is too long ({len} > {max} characters)")]
    TermTooLong {
        category: String,
        term: String,
        len: usize,
        max: usize,
    },

    #[error("{category} term '{term}' contains control characters")]
    ControlCharacters { category: String, term: String },

    #[error("{category} terms could not be compiled: {reason}")]
    Compile { category: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ScribeError>;
