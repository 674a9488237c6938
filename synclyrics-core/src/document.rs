use crate::error::{CoreError, Result};
use crate::lrc;
use crate::timestamp::{self, UNSYNCED_PLACEHOLDER};

/// A single lyric line and its optional start time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricLine {
    index: usize,
    text: String,
    start_ms: Option<u64>,
}

impl LyricLine {
    /// Position of this line in its document (0-based)
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Display text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Start time in milliseconds, or `None` if unsynced
    #[must_use]
    pub const fn start_ms(&self) -> Option<u64> {
        self.start_ms
    }

    #[must_use]
    pub const fn is_synced(&self) -> bool {
        self.start_ms.is_some()
    }

    /// Start time as an `[mm:ss.cc]` token
    #[must_use]
    pub fn start_token(&self) -> Option<String> {
        self.start_ms.map(timestamp::encode)
    }
}

/// Ordered lyric lines; document order is playback order.
///
/// Start times are expected to increase down the document but this is not
/// enforced: marking out of order is allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LyricDocument {
    lines: Vec<LyricLine>,
}

impl LyricDocument {
    /// Build an unsynced document, one line per non-blank input entry.
    #[must_use]
    pub fn load<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = lines
            .into_iter()
            .filter_map(|line| {
                let text = line.as_ref().trim();
                (!text.is_empty()).then(|| text.to_string())
            })
            .enumerate()
            .map(|(index, text)| LyricLine {
                index,
                text,
                start_ms: None,
            })
            .collect();

        Self { lines }
    }

    /// Build an unsynced document from plain newline-separated text
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::load(lrc::parse(text))
    }

    /// Build a document from `(text, start)` pairs, keeping their order.
    pub(crate) fn from_timed<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = (String, Option<u64>)>,
    {
        let lines = lines
            .into_iter()
            .enumerate()
            .map(|(index, (text, start_ms))| LyricLine {
                index,
                text,
                start_ms,
            })
            .collect();

        Self { lines }
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get a line by index
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IndexOutOfRange`] if `index >= line_count()`.
    pub fn get_line(&self, index: usize) -> Result<&LyricLine> {
        self.lines.get(index).ok_or(CoreError::IndexOutOfRange {
            index,
            len: self.lines.len(),
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = &LyricLine> {
        self.lines.iter()
    }

    /// Number of lines with a start time
    #[must_use]
    pub fn synced_count(&self) -> usize {
        self.lines.iter().filter(|l| l.is_synced()).count()
    }

    #[must_use]
    pub fn is_fully_synced(&self) -> bool {
        self.lines.iter().all(LyricLine::is_synced)
    }

    /// First unsynced line at or after `from`
    #[must_use]
    pub fn next_unsynced(&self, from: usize) -> Option<usize> {
        self.lines
            .iter()
            .skip(from)
            .find(|l| !l.is_synced())
            .map(LyricLine::index)
    }

    /// Effective end of a line: the next line's start if that line is
    /// synced, otherwise `None` (open-ended).
    #[must_use]
    pub fn effective_end(&self, index: usize) -> Option<u64> {
        index
            .checked_add(1)
            .and_then(|next| self.lines.get(next))
            .and_then(LyricLine::start_ms)
    }

    /// Range shown for a row, e.g. `[00:01.50] <-> [00:04.00]`.
    ///
    /// Unsynced rows show the placeholder; rows with an open end show the
    /// placeholder on the right.
    #[must_use]
    pub fn display_range(&self, index: usize) -> String {
        let Some(start) = self.lines.get(index).and_then(LyricLine::start_ms) else {
            return UNSYNCED_PLACEHOLDER.to_string();
        };

        let end = self
            .effective_end(index)
            .map_or_else(|| UNSYNCED_PLACEHOLDER.to_string(), timestamp::encode);

        format!("{} <-> {end}", timestamp::encode(start))
    }

    pub(crate) fn set_start(&mut self, index: usize, ms: u64) {
        if let Some(line) = self.lines.get_mut(index) {
            line.start_ms = Some(ms);
        }
    }

    pub(crate) fn clear_start(&mut self, index: usize) {
        if let Some(line) = self.lines.get_mut(index) {
            line.start_ms = None;
        }
    }

    /// Put back a previously captured start, including "unsynced".
    pub(crate) fn restore_start(&mut self, index: usize, start_ms: Option<u64>) {
        match start_ms {
            Some(ms) => self.set_start(index, ms),
            None => self.clear_start(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(lines: &[&str]) -> LyricDocument {
        LyricDocument::load(lines.iter().copied())
    }

    #[test]
    fn test_load_assigns_indices_and_unsynced() {
        let d = doc(&["Hello", "World"]);
        assert_eq!(d.line_count(), 2);
        assert_eq!(d.get_line(0).unwrap().index(), 0);
        assert_eq!(d.get_line(1).unwrap().text(), "World");
        assert!(d.lines().all(|l| l.start_ms().is_none()));
    }

    #[test]
    fn test_load_trims_and_skips_blank() {
        let d = doc(&["  First  ", "", "   ", "Second"]);
        assert_eq!(d.line_count(), 2);
        assert_eq!(d.get_line(0).unwrap().text(), "First");
        assert_eq!(d.get_line(1).unwrap().index(), 1);
    }

    #[test]
    fn test_from_text() {
        let d = LyricDocument::from_text("one\r\n\ntwo\n  three  \n");
        let texts: Vec<_> = d.lines().map(LyricLine::text).collect();
        assert_eq!(texts, ["one", "two", "three"]);
    }

    #[test]
    fn test_get_line_out_of_range() {
        let d = doc(&["only"]);
        let err = d.get_line(1).unwrap_err();
        assert!(matches!(err, CoreError::IndexOutOfRange { index: 1, len: 1 }));
    }

    #[test]
    fn test_set_and_clear_start() {
        let mut d = doc(&["a", "b"]);
        d.set_start(1, 2500);
        assert_eq!(d.get_line(1).unwrap().start_ms(), Some(2500));
        assert_eq!(d.get_line(1).unwrap().start_token().as_deref(), Some("[00:02.50]"));
        d.clear_start(1);
        assert!(!d.get_line(1).unwrap().is_synced());
    }

    #[test]
    fn test_set_start_out_of_range_is_ignored() {
        let mut d = doc(&["a"]);
        d.set_start(3, 100);
        assert_eq!(d.synced_count(), 0);
    }

    #[test]
    fn test_effective_end() {
        let mut d = doc(&["a", "b", "c"]);
        d.set_start(0, 1000);
        d.set_start(1, 2000);
        assert_eq!(d.effective_end(0), Some(2000));
        // Next line unsynced: open-ended.
        assert_eq!(d.effective_end(1), None);
        // Last line is always open-ended.
        d.set_start(2, 3000);
        assert_eq!(d.effective_end(2), None);
    }

    #[test]
    fn test_display_range() {
        let mut d = doc(&["a", "b"]);
        assert_eq!(d.display_range(0), "--:--.--");

        d.set_start(0, 1500);
        assert_eq!(d.display_range(0), "[00:01.50] <-> --:--.--");

        d.set_start(1, 4000);
        assert_eq!(d.display_range(0), "[00:01.50] <-> [00:04.00]");
        assert_eq!(d.display_range(1), "[00:04.00] <-> --:--.--");
        assert_eq!(d.display_range(9), "--:--.--");
    }

    #[test]
    fn test_sync_progress_queries() {
        let mut d = doc(&["a", "b", "c"]);
        assert_eq!(d.next_unsynced(0), Some(0));
        d.set_start(0, 10);
        d.set_start(2, 30);
        assert_eq!(d.synced_count(), 2);
        assert_eq!(d.next_unsynced(0), Some(1));
        assert_eq!(d.next_unsynced(2), None);
        assert!(!d.is_fully_synced());
        d.set_start(1, 20);
        assert!(d.is_fully_synced());
    }
}
