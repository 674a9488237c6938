use crate::document::LyricDocument;
use crate::lrc::{self, LrcMetadata};
use crate::playback::PlaybackClock;
use crate::sync::{MarkOutcome, SyncEngine};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

/// Events emitted by a sync session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Playback was started or resumed
    PlaybackStarted { position_ms: u64 },
    /// Playback was paused
    PlaybackPaused { position_ms: u64 },
    /// The position jumped
    Seeked { position_ms: u64 },
    /// A row received a start time
    LineMarked { outcome: MarkOutcome },
    /// The most recent mark was reverted
    MarkUndone { row: usize },
    /// The selected row moved
    SelectionChanged { row: usize },
    /// The line under the playhead changed
    ActiveLineChanged {
        row: Option<usize>,
        position_ms: u64,
    },
}

/// Session state
struct SyncSessionInner {
    engine: SyncEngine,
    clock: PlaybackClock,
    selected_row: usize,
    active_row: Option<usize>,
}

/// One sync session shared between input handling and the highlight ticker.
///
/// All state sits behind a single lock, so a mark or undo never interleaves
/// with an active-line poll.
pub struct SyncSession {
    inner: RwLock<SyncSessionInner>,
    event_tx: broadcast::Sender<SyncEvent>,
}

impl SyncSession {
    /// Create a new session over a document, selecting the first unsynced row
    #[must_use]
    pub fn new(document: LyricDocument, clock: PlaybackClock) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(64);
        let selected_row = document.next_unsynced(0).unwrap_or(0);

        info!(
            lines = document.line_count(),
            synced = document.synced_count(),
            "Sync session created"
        );

        Arc::new(Self {
            inner: RwLock::new(SyncSessionInner {
                engine: SyncEngine::new(document),
                clock,
                selected_row,
                active_row: None,
            }),
            event_tx,
        })
    }

    /// Subscribe to session events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.event_tx.subscribe()
    }

    fn emit(&self, event: SyncEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Start or pause playback; returns whether playback is now running
    pub async fn toggle_playback(&self) -> bool {
        let mut inner = self.inner.write().await;
        let playing = inner.clock.toggle();
        let position_ms = inner.clock.position_ms();
        drop(inner);

        if playing {
            self.emit(SyncEvent::PlaybackStarted { position_ms });
        } else {
            self.emit(SyncEvent::PlaybackPaused { position_ms });
        }
        playing
    }

    /// Jump relative to the current position
    pub async fn seek_by(&self, offset_ms: i64) -> u64 {
        let mut inner = self.inner.write().await;
        inner.clock.seek_by(offset_ms);
        let position_ms = inner.clock.position_ms();
        drop(inner);

        self.emit(SyncEvent::Seeked { position_ms });
        position_ms
    }

    /// Jump to an absolute position
    pub async fn seek_to(&self, position_ms: u64) -> u64 {
        let mut inner = self.inner.write().await;
        inner.clock.seek_to(position_ms);
        let position_ms = inner.clock.position_ms();
        drop(inner);

        self.emit(SyncEvent::Seeked { position_ms });
        position_ms
    }

    /// Mark the selected row at the current position and move the
    /// selection to the following row.
    pub async fn mark_selected(&self) -> Option<MarkOutcome> {
        let mut inner = self.inner.write().await;
        let row = inner.selected_row;
        let position_ms = inner.clock.position_ms();
        let is_playing = inner.clock.is_playing();

        let outcome = inner.engine.mark_active(row, position_ms, is_playing)?;
        inner.selected_row = outcome.next_row;
        drop(inner);

        self.emit(SyncEvent::LineMarked {
            outcome: outcome.clone(),
        });
        self.emit(SyncEvent::SelectionChanged {
            row: outcome.next_row,
        });
        Some(outcome)
    }

    /// Revert the most recent mark and select the row it was aimed at
    pub async fn undo(&self) -> Option<usize> {
        let mut inner = self.inner.write().await;
        let row = inner.engine.undo()?;
        inner.selected_row = row;
        drop(inner);

        self.emit(SyncEvent::MarkUndone { row });
        self.emit(SyncEvent::SelectionChanged { row });
        Some(row)
    }

    /// Move the selection; rows past the end are rejected
    pub async fn select(&self, row: usize) -> bool {
        let mut inner = self.inner.write().await;
        if row >= inner.engine.document().line_count() {
            debug!(row, "Selection out of range");
            return false;
        }
        inner.selected_row = row;
        drop(inner);

        self.emit(SyncEvent::SelectionChanged { row });
        true
    }

    /// Resolve the line under the playhead and emit
    /// [`SyncEvent::ActiveLineChanged`] if it differs from the last poll.
    pub async fn poll_active(&self) -> Option<usize> {
        let mut inner = self.inner.write().await;
        let position_ms = inner.clock.position_ms();
        let row = inner.engine.resolve_active(position_ms);
        let changed = inner.active_row != row;
        inner.active_row = row;
        drop(inner);

        if changed {
            debug!(?row, position_ms, "Active line changed");
            self.emit(SyncEvent::ActiveLineChanged { row, position_ms });
        }
        row
    }

    pub async fn is_playing(&self) -> bool {
        self.inner.read().await.clock.is_playing()
    }

    pub async fn position_ms(&self) -> u64 {
        self.inner.read().await.clock.position_ms()
    }

    pub async fn selected_row(&self) -> usize {
        self.inner.read().await.selected_row
    }

    pub async fn undo_depth(&self) -> usize {
        self.inner.read().await.engine.undo_depth()
    }

    /// Copy of the current document
    pub async fn document(&self) -> LyricDocument {
        self.inner.read().await.engine.document().clone()
    }

    /// Render the current document as LRC text
    pub async fn to_lrc(&self, metadata: &LrcMetadata) -> String {
        let inner = self.inner.read().await;
        lrc::serialize_with_metadata(inner.engine.document(), metadata)
    }
}
