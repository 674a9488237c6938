use crate::document::{LyricDocument, LyricLine};
use crate::resolver;
use crate::timestamp;
use crate::undo::{UndoRecord, UndoStack};
use tracing::{debug, info};

/// Whether the caller reports active playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    /// No playback: marking is disabled
    #[default]
    Idle,
    /// Playback running: marking and highlighting are live
    Playing,
}

impl SyncState {
    #[must_use]
    pub const fn from_playing(is_playing: bool) -> Self {
        if is_playing {
            Self::Playing
        } else {
            Self::Idle
        }
    }

    #[must_use]
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }
}

/// What a successful mark changed, ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkOutcome {
    /// The row that was marked
    pub row: usize,
    /// The new start token of `row`
    pub start_token: String,
    /// Display range of `row` after the mark; ends at the next row's start
    /// when that row is already synced
    pub range: String,
    /// The previous row and its refreshed display range, if it is synced
    pub previous: Option<(usize, String)>,
    /// Suggested next selection (`row + 1`; may equal the line count)
    pub next_row: usize,
}

/// Owns a lyric document and its undo history for one sync session.
///
/// The engine never drives playback itself: callers pass the current
/// position and whether playback is running on every call.
#[derive(Debug, Default)]
pub struct SyncEngine {
    document: LyricDocument,
    undo_stack: UndoStack,
}

impl SyncEngine {
    /// Create a new sync engine over a document
    #[must_use]
    pub const fn new(document: LyricDocument) -> Self {
        Self {
            document,
            undo_stack: UndoStack::new(),
        }
    }

    #[must_use]
    pub const fn document(&self) -> &LyricDocument {
        &self.document
    }

    /// Hand the document back, dropping the undo history
    #[must_use]
    pub fn into_document(self) -> LyricDocument {
        self.document
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.undo_stack.can_undo()
    }

    /// Set `row`'s start to the current playback position.
    ///
    /// Does nothing and returns `None` unless playback is running and `row`
    /// is in range. Otherwise records an undo entry for `row` (and for the
    /// previous row, whose displayed end changes) before overwriting.
    pub fn mark_active(
        &mut self,
        row: usize,
        position_ms: u64,
        is_playing: bool,
    ) -> Option<MarkOutcome> {
        if !is_playing {
            debug!(row, "Mark ignored: playback not active");
            return None;
        }
        if row >= self.document.line_count() {
            debug!(
                row,
                line_count = self.document.line_count(),
                "Mark ignored: row out of range"
            );
            return None;
        }

        let mut record = UndoRecord::new();
        record.capture(&self.document, row);
        let previous_row = row.checked_sub(1);
        if let Some(prev) = previous_row {
            record.capture(&self.document, prev);
        }
        self.undo_stack.push(record);

        self.document.set_start(row, position_ms);

        let start_token = timestamp::encode(position_ms);
        info!(row, position_ms, token = %start_token, "Line marked");

        let previous = previous_row
            .filter(|&prev| {
                self.document
                    .get_line(prev)
                    .is_ok_and(LyricLine::is_synced)
            })
            .map(|prev| (prev, self.document.display_range(prev)));

        Some(MarkOutcome {
            row,
            start_token,
            range: self.document.display_range(row),
            previous,
            next_row: row + 1,
        })
    }

    /// Revert the most recent mark.
    ///
    /// Returns the row that mark was aimed at, or `None` if there is
    /// nothing to undo.
    pub fn undo(&mut self) -> Option<usize> {
        let row = self.undo_stack.undo(&mut self.document);
        if let Some(row) = row {
            info!(row, "Mark undone");
        }
        row
    }

    /// The line playing at `position_ms`
    #[must_use]
    pub fn resolve_active(&self, position_ms: u64) -> Option<usize> {
        resolver::resolve_active(&self.document, position_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(lines: &[&str]) -> SyncEngine {
        SyncEngine::new(LyricDocument::load(lines.iter().copied()))
    }

    #[test]
    fn test_sync_state_from_playing() {
        assert_eq!(SyncState::from_playing(true), SyncState::Playing);
        assert_eq!(SyncState::from_playing(false), SyncState::Idle);
        assert!(!SyncState::default().is_playing());
    }

    #[test]
    fn test_mark_sets_start() {
        let mut e = engine(&["Hello", "World"]);
        let outcome = e.mark_active(0, 1500, true).unwrap();
        assert_eq!(outcome.row, 0);
        assert_eq!(outcome.start_token, "[00:01.50]");
        assert_eq!(outcome.range, "[00:01.50] <-> --:--.--");
        assert_eq!(outcome.previous, None);
        assert_eq!(outcome.next_row, 1);
        assert_eq!(e.document().get_line(0).unwrap().start_ms(), Some(1500));
        assert_eq!(e.undo_depth(), 1);
    }

    #[test]
    fn test_mark_reports_previous_display_range() {
        let mut e = engine(&["Hello", "World"]);
        e.mark_active(0, 1500, true);
        let outcome = e.mark_active(1, 4000, true).unwrap();
        assert_eq!(
            outcome.previous,
            Some((0, "[00:01.50] <-> [00:04.00]".to_string()))
        );
        // The previous line's stored start is untouched.
        assert_eq!(e.document().get_line(0).unwrap().start_ms(), Some(1500));
    }

    #[test]
    fn test_remark_range_ends_at_synced_next_row() {
        let mut e = engine(&["a", "b"]);
        e.mark_active(0, 1000, true);
        e.mark_active(1, 4000, true);
        let outcome = e.mark_active(0, 1200, true).unwrap();
        assert_eq!(outcome.range, "[00:01.20] <-> [00:04.00]");
    }

    #[test]
    fn test_mark_with_unsynced_previous_has_no_previous() {
        let mut e = engine(&["a", "b"]);
        let outcome = e.mark_active(1, 4000, true).unwrap();
        assert_eq!(outcome.previous, None);
    }

    #[test]
    fn test_mark_not_playing_is_noop() {
        let mut e = engine(&["a"]);
        assert!(e.mark_active(0, 1000, false).is_none());
        assert_eq!(e.document().synced_count(), 0);
        assert!(!e.can_undo());
    }

    #[test]
    fn test_mark_out_of_range_is_noop() {
        let mut e = engine(&["a", "b"]);
        assert!(e.mark_active(2, 1000, true).is_none());
        assert!(e.mark_active(usize::MAX, 1000, true).is_none());
        assert_eq!(e.document().synced_count(), 0);
        assert_eq!(e.undo_depth(), 0);
    }

    #[test]
    fn test_mark_on_empty_document_is_noop() {
        let mut e = SyncEngine::default();
        assert!(e.mark_active(0, 1000, true).is_none());
    }

    #[test]
    fn test_undo_restores_unsynced() {
        let mut e = engine(&["a", "b"]);
        e.mark_active(0, 1000, true);
        assert_eq!(e.undo(), Some(0));
        assert!(!e.document().get_line(0).unwrap().is_synced());
        assert!(!e.can_undo());
    }

    #[test]
    fn test_undo_empty_is_noop() {
        let mut e = engine(&["a"]);
        assert_eq!(e.undo(), None);
    }

    #[test]
    fn test_remark_then_undo_restores_previous_value() {
        let mut e = engine(&["a", "b"]);
        e.mark_active(0, 1000, true);
        e.mark_active(0, 1300, true);
        assert_eq!(e.document().get_line(0).unwrap().start_ms(), Some(1300));
        assert_eq!(e.undo(), Some(0));
        assert_eq!(e.document().get_line(0).unwrap().start_ms(), Some(1000));
    }

    #[test]
    fn test_undo_returns_primary_row_not_neighbor() {
        let mut e = engine(&["a", "b", "c"]);
        e.mark_active(0, 1000, true);
        e.mark_active(1, 2000, true);
        e.mark_active(2, 3000, true);
        assert_eq!(e.undo(), Some(2));
        assert_eq!(e.undo(), Some(1));
        assert_eq!(e.document().synced_count(), 1);
    }

    #[test]
    fn test_out_of_order_marking_is_tolerated() {
        let mut e = engine(&["a", "b", "c"]);
        assert!(e.mark_active(2, 9000, true).is_some());
        assert!(e.mark_active(0, 1000, true).is_some());
        assert_eq!(e.resolve_active(500), None);
        assert_eq!(e.resolve_active(1000), Some(0));
        assert_eq!(e.resolve_active(9500), Some(0));
    }

    #[test]
    fn test_sequence_resolves_between_marks() {
        let mut e = engine(&["a", "b", "c", "d"]);
        let starts = [1000_u64, 2500, 4000, 7000];
        for (row, &t) in starts.iter().enumerate() {
            e.mark_active(row, t, true);
        }
        for i in 0..starts.len() - 1 {
            let mid = (starts[i] + starts[i + 1]) / 2;
            assert_eq!(e.resolve_active(mid), Some(i));
        }
    }

    #[test]
    fn test_into_document() {
        let mut e = engine(&["a"]);
        e.mark_active(0, 10, true);
        let d = e.into_document();
        assert_eq!(d.synced_count(), 1);
    }
}
