//! Duration conversion helpers.
//!
//! Playback positions travel through the engine as integer milliseconds,
//! while clocks and timers work in [`Duration`]. These helpers saturate
//! instead of truncating.

use std::time::Duration;

/// Extension trait for safe Duration conversions.
pub trait DurationExt {
    /// Convert duration to milliseconds as u64, saturating at `u64::MAX`.
    fn as_millis_u64(&self) -> u64;
}

impl DurationExt for Duration {
    fn as_millis_u64(&self) -> u64 {
        u64::try_from(self.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Apply a signed millisecond offset to a position, clamping at zero.
#[must_use]
pub const fn offset_position(position_ms: u64, offset_ms: i64) -> u64 {
    if offset_ms >= 0 {
        position_ms.saturating_add(offset_ms.unsigned_abs())
    } else {
        position_ms.saturating_sub(offset_ms.unsigned_abs())
    }
}
