//! # Undo Stack
//!
//! Tracks the start times overwritten by each sync action so the action can
//! be reverted.
//!
//! ## Design
//!
//! - Each record captures the previous start of every line an action touched
//! - Records are pushed before the mutation is applied
//! - Undo pops the most recent record and restores every captured value,
//!   including "unsynced"
//! - The stack is unbounded and lives as long as the session

use crate::document::LyricDocument;
use tracing::debug;

/// A line's start time as it was before a sync action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoEntry {
    pub line_index: usize,
    pub previous_start_ms: Option<u64>,
}

/// Everything one sync action changed, in capture order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoRecord {
    entries: Vec<UndoEntry>,
}

impl UndoRecord {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Snapshot the current start of `line_index`
    pub fn capture(&mut self, document: &LyricDocument, line_index: usize) {
        if let Ok(line) = document.get_line(line_index) {
            self.entries.push(UndoEntry {
                line_index,
                previous_start_ms: line.start_ms(),
            });
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[UndoEntry] {
        &self.entries
    }

    /// The line the action was aimed at (the first captured entry)
    #[must_use]
    pub fn primary_index(&self) -> Option<usize> {
        self.entries.first().map(|e| e.line_index)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write every captured value back into the document
    fn restore(&self, document: &mut LyricDocument) {
        for entry in self.entries.iter().rev() {
            document.restore_start(entry.line_index, entry.previous_start_ms);
        }
    }
}

/// LIFO history of sync actions
#[derive(Debug, Default)]
pub struct UndoStack {
    records: Vec<UndoRecord>,
}

impl UndoStack {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Push a record; empty records are dropped
    pub fn push(&mut self, record: UndoRecord) {
        if record.is_empty() {
            return;
        }
        self.records.push(record);
        debug!(undo_depth = self.records.len(), "Undo record pushed");
    }

    /// Pop the most recent record and restore it onto `document`.
    ///
    /// Returns the primary line of the reverted action, or `None` when there
    /// is nothing to undo.
    pub fn undo(&mut self, document: &mut LyricDocument) -> Option<usize> {
        let record = self.records.pop()?;
        record.restore(document);
        debug!(
            undo_remaining = self.records.len(),
            primary = ?record.primary_index(),
            "Undo applied"
        );
        record.primary_index()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.records.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record the next undo would revert
    #[must_use]
    pub fn peek(&self) -> Option<&UndoRecord> {
        self.records.last()
    }
}
