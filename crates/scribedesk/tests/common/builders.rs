//! Builders for test fixtures.

#![allow(dead_code)]

use std::sync::Arc;

use scribedesk::api::{UploadOptions, UploadPayload};
use scribedesk::config::PollingConfig;
use scribedesk::history::{HistoryRecord, HistoryStatus};
use scribedesk::jobs::{JobRegistry, UploadTask};

use super::mock_api::MockApi;

/// Polling with the production interval and a custom ceiling/eviction delay.
pub fn polling(max_attempts: u32, eviction_delay_ms: u64) -> PollingConfig {
    PollingConfig {
        interval_ms: 2000,
        max_attempts,
        eviction_delay_ms,
    }
}

pub fn registry_with(api: Arc<MockApi>, polling: PollingConfig) -> JobRegistry {
    JobRegistry::new(api, polling, 256)
}

pub fn upload(filename: &str) -> UploadTask {
    let (task, _progress) = UploadTask::new(
        UploadPayload::new(filename, vec![0u8; 1024]),
        UploadOptions::default(),
    );
    task
}

/// Builder for history records.
pub struct RecordBuilder {
    record: HistoryRecord,
}

impl RecordBuilder {
    pub fn completed(id: &str, filename: &str) -> Self {
        Self {
            record: HistoryRecord::new(id, filename, HistoryStatus::Completed),
        }
    }

    pub fn failed(id: &str, filename: &str) -> Self {
        Self {
            record: HistoryRecord::new(id, filename, HistoryStatus::Failed),
        }
    }

    pub fn owner(mut self, owner: &str) -> Self {
        self.record.owner = Some(owner.to_string());
        self
    }

    pub fn analysis(mut self, status: &str) -> Self {
        self.record.analysis_status = status.to_string();
        self
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.record.duration = Some(seconds);
        self
    }

    pub fn completed_at(mut self, timestamp: &str) -> Self {
        self.record.completed_at = Some(timestamp.to_string());
        self
    }

    pub fn created_at(mut self, timestamp: &str) -> Self {
        self.record.created_at = Some(timestamp.to_string());
        self
    }

    pub fn build(self) -> HistoryRecord {
        self.record
    }
}
