//! Everything shown when a finished transcript is opened.

use serde::Serialize;
use tracing::{debug, instrument};

use super::parse::{format_timestamp, parse_transcript, TranscriptLine};
use super::playback::PlaybackSynchronizer;
use crate::annotator::{escape_html, TextAnnotator};
use crate::api::{TranscriptResult, TranscriptionApi};
use crate::error::ApiError;
use crate::history::PENDING_ANALYSIS;

/// Splits the backend's topic string on `|` or `,`.
pub fn split_topics(topics: &str) -> Vec<String> {
    topics
        .split(['|', ','])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptView {
    pub task_id: String,
    pub filename: String,
    pub summary: Option<String>,
    pub topics: Vec<String>,
    /// Seconds of audio.
    pub duration: Option<f64>,
    pub completed_at: Option<String>,
    pub language: Option<String>,
    /// Seconds the backend spent transcribing.
    pub processing_time: Option<f64>,
    pub analysis_status: String,
    pub lines: Vec<TranscriptLine>,
}

impl TranscriptView {
    /// Builds the view from a result. Annotation is redone on every open.
    pub fn build(task_id: &str, result: TranscriptResult, annotator: &TextAnnotator) -> Self {
        let lines = parse_transcript(result.text.as_deref().unwrap_or_default(), annotator);
        Self {
            task_id: result.task_id.unwrap_or_else(|| task_id.to_string()),
            filename: result.filename,
            summary: result.summary.filter(|s| !s.trim().is_empty()),
            topics: result.topics.as_deref().map(split_topics).unwrap_or_default(),
            duration: result.duration,
            completed_at: result.completed_at,
            language: result.language,
            processing_time: result.processing_time,
            analysis_status: result
                .analysis_status
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| PENDING_ANALYSIS.to_string()),
            lines,
        }
    }

    /// Fetches and builds the view for a completed job.
    #[instrument(skip(api, annotator))]
    pub async fn open(
        api: &dyn TranscriptionApi,
        job_id: &str,
        annotator: &TextAnnotator,
    ) -> Result<Self, ApiError> {
        let result = api.fetch_transcript(job_id).await?;
        let view = Self::build(job_id, result, annotator);
        debug!(lines = view.lines.len(), "Transcript opened");
        Ok(view)
    }

    pub fn synchronizer(&self) -> PlaybackSynchronizer {
        PlaybackSynchronizer::new(&self.lines)
    }

    /// `(line index, seconds)` of every timed line.
    pub fn seek_times(&self) -> Vec<(usize, u32)> {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| line.time_seconds.map(|t| (i, t)))
            .collect()
    }

    /// `MM:SS`, or `None` when the backend did not report a duration.
    pub fn formatted_duration(&self) -> Option<String> {
        self.duration
            .filter(|d| d.is_finite() && *d >= 0.0)
            .map(|d| format_timestamp(d.round() as u32))
    }

    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for (index, line) in self.lines.iter().enumerate() {
            html.push_str(&format!("<p class=\"transcript-line\" data-index=\"{}\"", index));
            if let Some(time) = line.time_seconds {
                html.push_str(&format!(" data-time=\"{}\"", time));
            }
            html.push('>');
            if let Some(time) = line.time_seconds {
                html.push_str(&format!(
                    "<span class=\"timestamp-link\">[{}]</span> ",
                    format_timestamp(time)
                ));
            }
            if let Some(speaker) = &line.speaker {
                html.push_str(&format!(
                    "<span class=\"speaker\">{}</span> ",
                    escape_html(speaker)
                ));
            }
            html.push_str(&line.html());
            html.push_str("</p>");
        }
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotator::KeywordConfig;

    fn result(text: &str) -> TranscriptResult {
        TranscriptResult {
            text: Some(text.to_string()),
            filename: "ligacao.mp3".to_string(),
            topics: Some("cobrança | acordo, ,multa".to_string()),
            duration: Some(125.4),
            ..Default::default()
        }
    }

    #[test]
    fn test_split_topics() {
        assert_eq!(split_topics("a|b , c,,"), vec!["a", "b", "c"]);
        assert!(split_topics(" | ").is_empty());
    }

    #[test]
    fn test_build_view() {
        let annotator = TextAnnotator::default();
        let view = TranscriptView::build(
            "task-1",
            result("[00:00] oi\nsem tempo\n[00:05] [Pessoa 2] tchau"),
            &annotator,
        );
        assert_eq!(view.task_id, "task-1");
        assert_eq!(view.topics, vec!["cobrança", "acordo", "multa"]);
        assert_eq!(view.analysis_status, PENDING_ANALYSIS);
        assert_eq!(view.seek_times(), vec![(0, 0), (2, 5)]);
        assert_eq!(view.formatted_duration().as_deref(), Some("02:05"));

        let sync = view.synchronizer();
        assert_eq!(sync.on_time_update(3.0), Some(0));
        assert_eq!(sync.on_time_update(6.0), Some(2));
    }

    #[test]
    fn test_html_is_escaped() {
        let annotator = TextAnnotator::new(KeywordConfig {
            caution: "multa".to_string(),
            ..Default::default()
        });
        let view = TranscriptView::build("t", result("[00:03] [<b>] multa <script>"), &annotator);
        let html = view.to_html();
        assert!(html.contains("data-time=\"3\""));
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("<span class=\"keyword keyword-caution\">multa</span>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_missing_text_yields_no_lines() {
        let view = TranscriptView::build("t", TranscriptResult::default(), &TextAnnotator::default());
        assert!(view.lines.is_empty());
        assert!(view.formatted_duration().is_none());
        assert!(view.topics.is_empty());
    }
}
