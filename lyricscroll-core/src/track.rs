//! The loaded lyric track: an ordered, replace-only sequence of timed lines.

use std::borrow::Cow;
use std::time::Duration;

/// A single line of lyrics with timing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricLine {
    /// Playback position (milliseconds from track start) at which this line becomes current
    pub start_ms: u64,
    /// Main lyric text
    pub text: String,
    /// Translation or romanization shown under the main text in bilingual mode
    pub secondary: Option<String>,
}

impl LyricLine {
    pub fn new(start_ms: u64, text: impl Into<String>) -> Self {
        Self {
            start_ms,
            text: text.into(),
            secondary: None,
        }
    }

    /// Attach the second-language text
    #[must_use]
    pub fn with_secondary(mut self, secondary: impl Into<String>) -> Self {
        self.secondary = Some(secondary.into());
        self
    }

    #[must_use]
    pub const fn start_time(&self) -> Duration {
        Duration::from_millis(self.start_ms)
    }

    /// Text handed to the layout engine: the main text, followed by the
    /// secondary text on its own row when present.
    #[must_use]
    pub fn display_text(&self) -> Cow<'_, str> {
        match &self.secondary {
            Some(secondary) => Cow::Owned(format!("{}\n{secondary}", self.text)),
            None => Cow::Borrowed(&self.text),
        }
    }
}

/// Ordered collection of lyric lines.
///
/// Lines are always sorted ascending by `start_ms`; lines sharing a timestamp
/// keep the order they were supplied in. Contents are only ever replaced as a
/// whole, never merged.
#[derive(Debug, Clone, Default)]
pub struct LyricTrack {
    lines: Vec<LyricLine>,
}

impl LyricTrack {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Discard the current contents and take ownership of `lines`, sorted by
    /// timestamp. `sort_by_key` is stable, so ties keep insertion order.
    pub fn replace(&mut self, mut lines: Vec<LyricLine>) {
        lines.sort_by_key(|line| line.start_ms);
        self.lines = lines;
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&LyricLine> {
        self.lines.get(index)
    }

    /// Index of the final line, `None` for an empty track
    #[must_use]
    pub fn last_index(&self) -> Option<usize> {
        self.lines.len().checked_sub(1)
    }
}

impl From<Vec<LyricLine>> for LyricTrack {
    fn from(lines: Vec<LyricLine>) -> Self {
        let mut track = Self::new();
        track.replace(lines);
        track
    }
}
