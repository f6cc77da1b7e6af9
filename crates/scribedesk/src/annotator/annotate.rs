use serde::Serialize;

use super::index::KeywordIndex;
use super::keywords::{KeywordCategory, KeywordConfig, KeywordSet};
use crate::error::AnnotationConfigError;

/// A run of transcript text, marked with a category when it is a keyword hit.
///
/// `text` is raw; escape it (or use [`render_html`]) before putting it in markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<KeywordCategory>,
}

impl Segment {
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            category: None,
        }
    }

    pub fn marked(text: &str, category: KeywordCategory) -> Self {
        Self {
            text: text.to_string(),
            category: Some(category),
        }
    }

    pub fn is_marked(&self) -> bool {
        self.category.is_some()
    }
}

fn push_plain(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    match segments.last_mut() {
        Some(last) if last.category.is_none() => last.text.push_str(text),
        _ => segments.push(Segment::plain(text)),
    }
}

/// Splits `text` into alternating plain and keyword segments.
///
/// Matches are leftmost and non-overlapping; at a given position the longest
/// configured term wins. Concatenating the segment texts yields `text`.
pub fn annotate(text: &str, index: &KeywordIndex) -> Vec<Segment> {
    if text.is_empty() {
        return Vec::new();
    }
    let Some(matcher) = index.matcher() else {
        return vec![Segment::plain(text)];
    };

    let mut segments = Vec::new();
    let mut last = 0;
    for hit in matcher.find_iter(text) {
        push_plain(&mut segments, &text[last..hit.start()]);
        match index.category_of(hit.as_str()) {
            Some(category) => segments.push(Segment::marked(hit.as_str(), category)),
            // Case folding the matcher knows but lowercase lookup does not.
            None => push_plain(&mut segments, hit.as_str()),
        }
        last = hit.end();
    }
    push_plain(&mut segments, &text[last..]);
    segments
}

/// Escapes characters significant in HTML.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders segments as HTML, escaping every segment.
pub fn render_html(segments: &[Segment]) -> String {
    let mut html = String::new();
    for segment in segments {
        match segment.category {
            Some(category) => {
                html.push_str("<span class=\"keyword keyword-");
                html.push_str(category.as_str());
                html.push_str("\">");
                html.push_str(&escape_html(&segment.text));
                html.push_str("</span>");
            }
            None => html.push_str(&escape_html(&segment.text)),
        }
    }
    html
}

/// Annotator bound to one keyword configuration.
///
/// The index is rebuilt only when the configuration changes.
#[derive(Debug, Clone, Default)]
pub struct TextAnnotator {
    config: KeywordConfig,
    index: KeywordIndex,
}

impl TextAnnotator {
    pub fn new(config: KeywordConfig) -> Self {
        let index = KeywordIndex::from_config(&config);
        Self { config, index }
    }

    pub fn from_sets(sets: &[KeywordSet]) -> Self {
        Self {
            config: KeywordConfig::from_sets(sets),
            index: KeywordIndex::build(sets),
        }
    }

    /// Returns whether the index was rebuilt.
    pub fn reconfigure(&mut self, config: KeywordConfig) -> bool {
        if config == self.config {
            return false;
        }
        self.index = KeywordIndex::from_config(&config);
        self.config = config;
        true
    }

    pub fn config(&self) -> &KeywordConfig {
        &self.config
    }

    pub fn index(&self) -> &KeywordIndex {
        &self.index
    }

    pub fn errors(&self) -> &[AnnotationConfigError] {
        self.index.errors()
    }

    pub fn annotate(&self, text: &str) -> Vec<Segment> {
        annotate(text, &self.index)
    }

    pub fn annotate_html(&self, text: &str) -> String {
        render_html(&self.annotate(text))
    }
}
