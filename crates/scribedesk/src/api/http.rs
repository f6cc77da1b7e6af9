//! reqwest-backed implementation of [`TranscriptionApi`].

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info_span, Instrument};

use super::types::{
    HistoryResponse, PollResponse, SubmitResponse, TranscriptResult, UploadOptions, UploadPayload,
};
use super::TranscriptionApi;
use crate::annotator::KeywordConfig;
use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::history::{HistoryRecord, HistoryScope};
use crate::jobs::UploadProgress;

/// Maximum length of a response body quoted in an error.
const MAX_ERROR_BODY_LENGTH: usize = 200;

fn truncate_body(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY_LENGTH {
        let head: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
        format!("{}... (truncated)", head)
    } else {
        body.to_string()
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Pulls the human-readable `detail` out of an error response.
///
/// Accepts `{"detail": "..."}` and validation-style `{"detail": [{"msg": "..."}]}`;
/// anything else is quoted (truncated).
pub(crate) fn extract_detail(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        match parsed.detail {
            serde_json::Value::String(s) => return s,
            serde_json::Value::Array(items) => {
                let messages: Vec<String> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .map(|m| m.to_string())
                    .collect();
                if !messages.is_empty() {
                    return messages.join("; ");
                }
            }
            _ => {}
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no response body".to_string()
    } else {
        truncate_body(trimmed)
    }
}

pub struct HttpTranscriptionApi {
    client: Client,
    base_url: String,
    token: Option<SecretString>,
    chunk_size: usize,
}

impl HttpTranscriptionApi {
    pub fn new(config: &ServerConfig) -> Result<Self, ApiError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ApiError::InvalidUrl {
                url: config.base_url.clone(),
                reason: "expected http:// or https://".to_string(),
            });
        }

        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: None,
            chunk_size: config.upload_chunk_bytes.max(1),
        })
    }

    /// Sends `Authorization: Bearer <token>` on every request.
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            detail: extract_detail(&body),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .authorized(self.client.get(self.url(path)))
            .send()
            .await?;
        let response = Self::check(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<(), ApiError> {
        let response = self
            .authorized(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl TranscriptionApi for HttpTranscriptionApi {
    async fn submit(
        &self,
        payload: &UploadPayload,
        options: UploadOptions,
        progress: &UploadProgress,
    ) -> Result<SubmitResponse, ApiError> {
        let total = payload.bytes.len() as u64;
        let chunks: Vec<Vec<u8>> = payload
            .bytes
            .chunks(self.chunk_size)
            .map(|chunk| chunk.to_vec())
            .collect();

        let sink = progress.clone();
        let mut sent = 0u64;
        let stream = futures_util::stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            sink.report(sent, total);
            Ok::<Vec<u8>, std::io::Error>(chunk)
        }));

        let mime = mime_guess::from_path(&payload.filename).first_or_octet_stream();
        let part = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(payload.filename.clone())
            .mime_str(mime.as_ref())?;

        let form = Form::new()
            .part("file", part)
            .text("timestamp", options.timestamps.to_string())
            .text("diarization", options.diarization.to_string());

        let span = info_span!("api.upload", filename = %payload.filename, bytes = total);
        async {
            let response = self
                .authorized(self.client.post(self.url("/api/upload")))
                .multipart(form)
                .send()
                .await?;
            let response = Self::check(response).await?;
            let accepted: SubmitResponse = response
                .json()
                .await
                .map_err(|e| ApiError::Decode(e.to_string()))?;
            debug!(task_id = %accepted.task_id, "upload accepted");
            Ok::<SubmitResponse, ApiError>(accepted)
        }
        .instrument(span)
        .await
    }

    async fn poll(&self, job_id: &str) -> Result<PollResponse, ApiError> {
        self.get_json(&format!("/api/status/{}", job_id)).await
    }

    async fn fetch_history(&self, scope: HistoryScope) -> Result<Vec<HistoryRecord>, ApiError> {
        let mut request = self.client.get(self.url("/api/history"));
        if scope == HistoryScope::All {
            request = request.query(&[("all", "true")]);
        }
        let response = self.authorized(request).send().await?;
        let response = Self::check(response).await?;
        let body: HistoryResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(body.into_records())
    }

    async fn fetch_keywords(&self) -> Result<KeywordConfig, ApiError> {
        self.get_json("/api/config/keywords").await
    }

    async fn update_keywords(&self, config: &KeywordConfig) -> Result<(), ApiError> {
        let body = serde_json::to_value(config).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.post_json("/api/admin/config/keywords", &body).await
    }

    async fn fetch_transcript(&self, job_id: &str) -> Result<TranscriptResult, ApiError> {
        self.get_json(&format!("/api/result/{}", job_id)).await
    }

    async fn rename(&self, job_id: &str, new_name: &str) -> Result<(), ApiError> {
        self.post_json(
            &format!("/api/rename/{}", job_id),
            &serde_json::json!({ "new_name": new_name }),
        )
        .await
    }

    async fn update_analysis_status(&self, job_id: &str, status: &str) -> Result<(), ApiError> {
        self.post_json(
            &format!("/api/task/{}/analysis", job_id),
            &serde_json::json!({ "status": status }),
        )
        .await
    }

    async fn delete(&self, job_id: &str) -> Result<(), ApiError> {
        let response = self
            .authorized(self.client.delete(self.url(&format!("/api/task/{}", job_id))))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn download_text(&self, job_id: &str) -> Result<String, ApiError> {
        let response = self
            .authorized(self.client.get(self.url(&format!("/api/download/{}", job_id))))
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.text().await?)
    }
}
