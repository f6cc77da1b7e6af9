use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::annotator::{render_html, Segment, TextAnnotator};

/// `[MM:SS]` at line start, then an optional `[Speaker]` label and colon.
static RE_LINE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\[(\d{2,}):(\d{2})\])?\s*(?:\[([^\[\]]*)\]:?)?\s*").unwrap()
});

/// Label used by the backend when it could not tell who spoke.
const UNKNOWN_SPEAKER: &str = "?";

/// One transcript line split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptLine {
    /// Seconds from the start of the audio; `None` for untimed lines.
    pub time_seconds: Option<u32>,
    pub speaker: Option<String>,
    /// Line body without timestamp or speaker label.
    pub text: String,
    pub segments: Vec<Segment>,
}

impl TranscriptLine {
    pub fn is_timed(&self) -> bool {
        self.time_seconds.is_some()
    }

    /// Escaped, keyword-highlighted body.
    pub fn html(&self) -> String {
        render_html(&self.segments)
    }
}

/// Prefix fields of a raw line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineHeader<'a> {
    pub time_seconds: Option<u32>,
    pub speaker: Option<&'a str>,
    pub body: &'a str,
}

pub fn parse_header(line: &str) -> LineHeader<'_> {
    let Some(caps) = RE_LINE_HEADER.captures(line) else {
        return LineHeader {
            time_seconds: None,
            speaker: None,
            body: line.trim(),
        };
    };

    let time_seconds = match (caps.get(1), caps.get(2)) {
        (Some(mm), Some(ss)) => {
            let minutes = mm.as_str().parse::<u32>().ok();
            let seconds = ss.as_str().parse::<u32>().ok();
            minutes
                .zip(seconds)
                .and_then(|(m, s)| m.checked_mul(60).and_then(|m| m.checked_add(s)))
        }
        _ => None,
    };

    let speaker = caps
        .get(3)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty() && *s != UNKNOWN_SPEAKER);

    let consumed = caps.get(0).map_or(0, |m| m.end());
    LineHeader {
        time_seconds,
        speaker,
        body: line[consumed..].trim_end(),
    }
}

/// Parses transcript text into annotated lines. Blank lines are skipped.
pub fn parse_transcript(text: &str, annotator: &TextAnnotator) -> Vec<TranscriptLine> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let header = parse_header(line);
            TranscriptLine {
                time_seconds: header.time_seconds,
                speaker: header.speaker.map(str::to_string),
                text: header.body.to_string(),
                segments: annotator.annotate(header.body),
            }
        })
        .collect()
}

/// `125` → `02:05`; minutes are not wrapped into hours.
pub fn format_timestamp(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
