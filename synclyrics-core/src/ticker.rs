//! Periodic active-line polling.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::session::SyncSession;

/// `tokio::time::interval` rejects a zero period
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Polls a session's active line on a fixed cadence while playback runs
pub struct ActiveLineTicker {
    session: Arc<SyncSession>,
    interval: Duration,
    cancel_token: CancellationToken,
}

impl ActiveLineTicker {
    /// Create a new ticker
    ///
    /// # Arguments
    /// * `session` - Session to poll
    /// * `interval` - Time between polls
    /// * `cancel_token` - Optional external cancellation token for graceful shutdown
    pub fn new(
        session: Arc<SyncSession>,
        interval: Duration,
        cancel_token: Option<CancellationToken>,
    ) -> Self {
        Self {
            session,
            interval: interval.max(MIN_INTERVAL),
            cancel_token: cancel_token.unwrap_or_default(),
        }
    }

    /// Get a clone of the cancellation token
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Start the ticker in a background task
    #[must_use]
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Run the polling loop
    async fn run(&self) {
        info!(interval = ?self.interval, "Starting active line ticker");

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!("Active line ticker shutting down");
                    break;
                }
                _ = interval.tick() => {
                    if self.session.is_playing().await {
                        self.session.poll_active().await;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::LyricDocument;
    use crate::playback::PlaybackClock;
    use crate::session::SyncEvent;

    #[tokio::test(start_paused = true)]
    async fn test_ticker_reports_line_changes() {
        let session = SyncSession::new(
            LyricDocument::load(["First", "Second"]),
            PlaybackClock::new(),
        );
        session.toggle_playback().await;
        session.seek_to(1000).await;
        session.mark_selected().await;
        session.seek_to(2000).await;
        session.mark_selected().await;
        session.seek_to(0).await;

        let mut rx = session.subscribe();
        let ticker = Arc::new(ActiveLineTicker::new(
            Arc::clone(&session),
            Duration::from_millis(100),
            None,
        ));
        let cancel = ticker.cancel_token();
        let handle = ticker.start();

        match rx.recv().await.unwrap() {
            SyncEvent::ActiveLineChanged { row, position_ms } => {
                assert_eq!(row, Some(0));
                assert!((1000..2000).contains(&position_ms));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        match rx.recv().await.unwrap() {
            SyncEvent::ActiveLineChanged { row, position_ms } => {
                assert_eq!(row, Some(1));
                assert!(position_ms >= 2000);
            }
            other => panic!("unexpected event: {other:?}"),
        }

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_idle_while_paused() {
        let session = SyncSession::new(LyricDocument::load(["Only"]), PlaybackClock::new());
        session.toggle_playback().await;
        session.mark_selected().await;
        session.toggle_playback().await;

        let mut rx = session.subscribe();
        let cancel = CancellationToken::new();
        let ticker = Arc::new(ActiveLineTicker::new(
            Arc::clone(&session),
            Duration::from_millis(100),
            Some(cancel.clone()),
        ));
        let handle = ticker.start();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());

        cancel.cancel();
        handle.await.unwrap();
    }
}
