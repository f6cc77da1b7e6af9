//! One file submission.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::api::{TranscriptionApi, UploadOptions, UploadPayload};
use crate::error::SubmissionError;

/// Progress sink for one upload.
///
/// Forwards fractions in `[0, 1]` to the task's receiver, dropping anything that
/// is not strictly greater than the last value sent.
#[derive(Clone)]
pub struct UploadProgress {
    sender: mpsc::UnboundedSender<f64>,
    last: Arc<Mutex<f64>>,
}

impl UploadProgress {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<f64>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let progress = Self {
            sender,
            last: Arc::new(Mutex::new(-1.0)),
        };
        (progress, receiver)
    }

    /// Reports `sent` of `total` bytes transferred.
    pub fn report(&self, sent: u64, total: u64) {
        if total == 0 {
            self.report_fraction(1.0);
        } else {
            self.report_fraction(sent as f64 / total as f64);
        }
    }

    pub fn report_fraction(&self, fraction: f64) {
        if !fraction.is_finite() {
            return;
        }
        let fraction = fraction.clamp(0.0, 1.0);
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if fraction > *last {
            *last = fraction;
            // Receiver may have been dropped; the upload still proceeds.
            let _ = self.sender.send(fraction);
        }
    }

    /// Last fraction forwarded, if any.
    pub fn last(&self) -> Option<f64> {
        let last = match self.last.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        };
        (last >= 0.0).then_some(last)
    }
}

/// Result of an accepted upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedUpload {
    pub job_id: String,
    pub filename: String,
}

/// Wraps one file submission; resolves once into a job id or a [`SubmissionError`].
///
/// Never retries; the caller decides whether to submit again.
pub struct UploadTask {
    id: Uuid,
    payload: UploadPayload,
    options: UploadOptions,
    progress: UploadProgress,
}

impl UploadTask {
    /// Creates the task and the receiving end of its progress stream.
    pub fn new(
        payload: UploadPayload,
        options: UploadOptions,
    ) -> (Self, mpsc::UnboundedReceiver<f64>) {
        let (progress, receiver) = UploadProgress::channel();
        let task = Self {
            id: Uuid::new_v4(),
            payload,
            options,
            progress,
        };
        (task, receiver)
    }

    /// Client-side identifier, useful to key UI rows before a job id exists.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn filename(&self) -> &str {
        &self.payload.filename
    }

    pub fn options(&self) -> UploadOptions {
        self.options
    }

    pub async fn run(self, api: &dyn TranscriptionApi) -> Result<AcceptedUpload, SubmissionError> {
        let span = info_span!("upload", upload_id = %self.id, filename = %self.payload.filename);
        async move {
            let response = match api
                .submit(&self.payload, self.options, &self.progress)
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!("Upload rejected: {}", e);
                    return Err(SubmissionError::from(e));
                }
            };

            let job_id = response.task_id.trim();
            if job_id.is_empty() {
                return Err(SubmissionError::MissingJobId);
            }

            self.progress.report_fraction(1.0);
            info!(job_id = %job_id, "Upload accepted");

            Ok(AcceptedUpload {
                job_id: job_id.to_string(),
                filename: self.payload.filename.clone(),
            })
        }
        .instrument(span)
        .await
    }
}
