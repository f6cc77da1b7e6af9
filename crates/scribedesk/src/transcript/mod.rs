//! Transcript parsing, rendering and playback synchronization.

pub mod parse;
pub mod playback;
pub mod view;

pub use parse::{format_timestamp, parse_header, parse_transcript, LineHeader, TranscriptLine};
pub use playback::PlaybackSynchronizer;
pub use view::{split_topics, TranscriptView};
