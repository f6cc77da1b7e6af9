pub mod annotator;
pub mod api;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod history;
pub mod jobs;
pub mod logging;
pub mod transcript;

pub use annotator::{KeywordCategory, KeywordConfig, KeywordIndex, KeywordSet, TextAnnotator};
pub use api::{HttpTranscriptionApi, TranscriptionApi};
pub use broadcast::{JobEvent, JobEventBroadcaster, RemovalReason};
pub use config::{load_config, EngineConfig};
pub use error::{
    AnnotationConfigError, ApiError, ConfigError, JobError, RegistryError, Result, ScribeError,
    SubmissionError,
};
pub use history::{HistoryFilter, HistoryRecord, HistoryScope, HistorySort, HistoryView};
pub use jobs::{Job, JobRegistry, JobStatus, UploadTask};
pub use logging::init_logging;
pub use transcript::{PlaybackSynchronizer, TranscriptLine, TranscriptView};
