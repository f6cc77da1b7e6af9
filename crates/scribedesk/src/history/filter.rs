use serde::{Deserialize, Serialize};

use super::record::{HistoryRecord, HistoryScope, HistoryStatus};

/// Status filter value that selects failed records instead of an analysis status.
pub const FAILED_STATUS_FILTER: &str = "failed";

/// History filters. All set filters must match; blank values are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFilter {
    /// Case-insensitive substring of the filename.
    #[serde(default)]
    pub filename: Option<String>,
    /// Prefix of the completion timestamp, usually `YYYY-MM-DD`.
    #[serde(default)]
    pub date: Option<String>,
    /// `failed`, or an analysis status to match exactly.
    #[serde(default)]
    pub status: Option<String>,
    /// Case-insensitive substring of the owner. Only applies to the all-users scope.
    #[serde(default)]
    pub owner: Option<String>,
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl HistoryFilter {
    pub fn with_filename(mut self, filename: &str) -> Self {
        self.filename = Some(filename.to_string());
        self
    }

    pub fn with_date(mut self, date: &str) -> Self {
        self.date = Some(date.to_string());
        self
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn with_owner(mut self, owner: &str) -> Self {
        self.owner = Some(owner.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        active(&self.filename).is_none()
            && active(&self.date).is_none()
            && active(&self.status).is_none()
            && active(&self.owner).is_none()
    }

    pub fn matches(&self, record: &HistoryRecord, scope: HistoryScope) -> bool {
        if let Some(needle) = active(&self.filename) {
            if !record
                .filename
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }

        // Records without a completion time are never hidden by the date filter.
        if let (Some(prefix), Some(completed_at)) = (active(&self.date), &record.completed_at) {
            if !completed_at.starts_with(prefix) {
                return false;
            }
        }

        if let Some(status) = active(&self.status) {
            let passes = if status == FAILED_STATUS_FILTER {
                record.status == HistoryStatus::Failed
            } else {
                record.analysis_status == status
            };
            if !passes {
                return false;
            }
        }

        if scope == HistoryScope::All {
            if let (Some(needle), Some(owner)) = (active(&self.owner), &record.owner) {
                if !owner.to_lowercase().contains(&needle.to_lowercase()) {
                    return false;
                }
            }
        }

        true
    }
}
