use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Analysis status of a transcript nobody has reviewed yet.
pub const PENDING_ANALYSIS: &str = "Pendente de análise";

/// Analysis statuses offered by the dashboard. Other values are kept verbatim.
pub const ANALYSIS_STATUSES: [&str; 4] = [
    PENDING_ANALYSIS,
    "Procedente",
    "Improcedente",
    "Sem conclusão",
];

/// Final status of a history record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStatus {
    #[default]
    Completed,
    Failed,
    /// Anything the server still reports as running.
    #[serde(other)]
    InProgress,
}

/// Which records the history endpoint returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryScope {
    /// The current user's records.
    #[default]
    Own,
    /// Every user's records. Privileged users only.
    All,
}

/// A finished job as stored by the backend. Read-only to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub task_id: String,
    #[serde(default)]
    pub filename: String,
    /// Only present in all-users listings.
    #[serde(default, rename = "owner_name", alias = "owner")]
    pub owner: Option<String>,
    #[serde(default)]
    pub status: HistoryStatus,
    #[serde(
        default = "pending_analysis",
        deserialize_with = "analysis_or_pending"
    )]
    pub analysis_status: String,
    /// Seconds of audio.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

fn pending_analysis() -> String {
    PENDING_ANALYSIS.to_string()
}

fn analysis_or_pending<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(pending_analysis))
}

impl HistoryRecord {
    pub fn new(task_id: &str, filename: &str, status: HistoryStatus) -> Self {
        Self {
            task_id: task_id.to_string(),
            filename: filename.to_string(),
            owner: None,
            status,
            analysis_status: pending_analysis(),
            duration: None,
            created_at: None,
            completed_at: None,
            error: None,
        }
    }

    pub fn is_pending_analysis(&self) -> bool {
        self.analysis_status == PENDING_ANALYSIS
    }

    pub fn completed_time(&self) -> Option<DateTime<Utc>> {
        self.completed_at.as_deref().and_then(parse_timestamp)
    }

    pub fn created_time(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }
}

/// Parses RFC 3339 or a naive ISO-8601 timestamp (taken as UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_record_defaults() {
        let record: HistoryRecord =
            serde_json::from_str(r#"{"task_id": "t1", "status": "failed"}"#).unwrap();
        assert_eq!(record.status, HistoryStatus::Failed);
        assert_eq!(record.analysis_status, PENDING_ANALYSIS);
        assert!(record.owner.is_none());
        assert!(record.is_pending_analysis());
    }

    #[test]
    fn test_null_analysis_status_is_pending() {
        let record: HistoryRecord = serde_json::from_str(
            r#"{"task_id": "t1", "status": "completed", "analysis_status": null}"#,
        )
        .unwrap();
        assert_eq!(record.analysis_status, PENDING_ANALYSIS);
    }

    #[test]
    fn test_owner_name_and_unknown_status() {
        let record: HistoryRecord = serde_json::from_str(
            r#"{"task_id": "t1", "status": "processing", "owner_name": "ana",
                "analysis_status": "Procedente", "duration": 61.5}"#,
        )
        .unwrap();
        assert_eq!(record.status, HistoryStatus::InProgress);
        assert_eq!(record.owner.as_deref(), Some("ana"));
        assert_eq!(record.analysis_status, "Procedente");
        assert_eq!(record.duration, Some(61.5));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = parse_timestamp("2024-03-01T10:00:00Z").unwrap();
        let naive = parse_timestamp("2024-03-01T10:00:00.250000").unwrap();
        let spaced = parse_timestamp("2024-03-01 10:00:00").unwrap();
        assert_eq!(rfc, spaced);
        assert!(naive > rfc);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_analysis_statuses_start_with_pending() {
        assert_eq!(ANALYSIS_STATUSES[0], PENDING_ANALYSIS);
    }
}
