use crate::sync::SyncState;
use crate::time::{offset_position, DurationExt};
use std::time::Duration;
use tokio::time::Instant;

/// Playback position source for drivers without an audio backend.
///
/// The position is interpolated from the last play/seek using the tokio
/// clock, so tests running on a paused runtime see deterministic time.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    /// Whether playback is currently running
    is_playing: bool,
    /// Position at `updated_at`
    position: Duration,
    /// Total length, if known; the position is clamped to it
    duration: Option<Duration>,
    /// When `position` was last set (for interpolation)
    updated_at: Instant,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self {
            is_playing: false,
            position: Duration::ZERO,
            duration: None,
            updated_at: Instant::now(),
        }
    }
}

impl PlaybackClock {
    /// Create a paused clock at position zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamp the position to a known track length
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.is_playing
    }

    #[must_use]
    pub const fn state(&self) -> SyncState {
        SyncState::from_playing(self.is_playing)
    }

    /// Get interpolated position based on time elapsed since last update
    #[must_use]
    pub fn interpolated_position(&self) -> Duration {
        if !self.is_playing {
            return self.position;
        }

        let interpolated = self.position + self.updated_at.elapsed();
        self.clamp(interpolated)
    }

    /// Current position in milliseconds
    #[must_use]
    pub fn position_ms(&self) -> u64 {
        self.interpolated_position().as_millis_u64()
    }

    pub fn play(&mut self) {
        if self.is_playing {
            return;
        }
        self.updated_at = Instant::now();
        self.is_playing = true;
    }

    pub fn pause(&mut self) {
        if !self.is_playing {
            return;
        }
        self.position = self.interpolated_position();
        self.updated_at = Instant::now();
        self.is_playing = false;
    }

    /// Flip between playing and paused; returns the new playing flag
    pub fn toggle(&mut self) -> bool {
        if self.is_playing {
            self.pause();
        } else {
            self.play();
        }
        self.is_playing
    }

    /// Jump to an absolute position
    pub fn seek_to(&mut self, position_ms: u64) {
        self.position = self.clamp(Duration::from_millis(position_ms));
        self.updated_at = Instant::now();
    }

    /// Jump relative to the current position, clamping at zero
    pub fn seek_by(&mut self, offset_ms: i64) {
        self.seek_to(offset_position(self.position_ms(), offset_ms));
    }

    fn clamp(&self, position: Duration) -> Duration {
        self.duration.map_or(position, |d| position.min(d))
    }
}
