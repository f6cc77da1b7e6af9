use tokio::sync::watch;

use super::parse::TranscriptLine;

/// Tracks which transcript line matches the audio position.
///
/// Observers subscribe to a watch channel that only changes when the active
/// line does, so repeated time updates within one line cause no UI work.
pub struct PlaybackSynchronizer {
    times: Vec<Option<u32>>,
    active: watch::Sender<Option<usize>>,
}

impl PlaybackSynchronizer {
    pub fn new(lines: &[TranscriptLine]) -> Self {
        Self::from_times(lines.iter().map(|line| line.time_seconds))
    }

    /// One entry per line; `None` for untimed lines.
    pub fn from_times<I>(times: I) -> Self
    where
        I: IntoIterator<Item = Option<u32>>,
    {
        let (active, _) = watch::channel(None);
        Self {
            times: times.into_iter().collect(),
            active,
        }
    }

    /// Index of the last timed line at or before `current_seconds`.
    pub fn line_at(&self, current_seconds: f64) -> Option<usize> {
        if current_seconds.is_nan() {
            return None;
        }
        let mut found = None;
        for (index, time) in self.times.iter().enumerate() {
            if let Some(t) = time {
                if f64::from(*t) <= current_seconds {
                    found = Some(index);
                }
            }
        }
        found
    }

    /// Applies a playback position and returns the active line.
    pub fn on_time_update(&self, current_seconds: f64) -> Option<usize> {
        let next = self.line_at(current_seconds);
        self.active.send_if_modified(|active| {
            if *active == next {
                false
            } else {
                *active = next;
                true
            }
        });
        next
    }

    pub fn active(&self) -> Option<usize> {
        *self.active.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<usize>> {
        self.active.subscribe()
    }

    /// Where to seek when a line is clicked.
    pub fn seek_time(&self, index: usize) -> Option<u32> {
        self.times.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}
