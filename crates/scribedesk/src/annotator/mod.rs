//! Keyword highlighting of transcript text.

pub mod annotate;
pub mod index;
pub mod keywords;

pub use annotate::{annotate, escape_html, render_html, Segment, TextAnnotator};
pub use index::{KeywordIndex, MAX_TERM_LEN};
pub use keywords::{KeywordCategory, KeywordConfig, KeywordSet};
