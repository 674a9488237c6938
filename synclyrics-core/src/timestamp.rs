//! Conversion between `[mm:ss.cc]` timestamp tokens and milliseconds.
//!
//! Tokens carry hundredths of a second, so encoding drops the last
//! millisecond digit. Minutes are never truncated: a position past
//! 99 minutes renders with three or more minute digits.

use crate::error::{CoreError, Result};

/// Display string for a line that has not been synced yet.
pub const UNSYNCED_PLACEHOLDER: &str = "--:--.--";

const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_SECOND: u64 = 1_000;
const MS_PER_CENTISECOND: u64 = 10;

/// Format a millisecond position as an `[mm:ss.cc]` token.
#[must_use]
pub fn encode(ms: u64) -> String {
    let minutes = ms / MS_PER_MINUTE;
    let seconds = (ms % MS_PER_MINUTE) / MS_PER_SECOND;
    let centis = (ms % MS_PER_SECOND) / MS_PER_CENTISECOND;
    format!("[{minutes:02}:{seconds:02}.{centis:02}]")
}

/// Parse a timestamp token, falling back to `0` on any malformed input.
///
/// A bad token reads as "start of track". Use [`decode_strict`] when the
/// caller needs to see the failure.
#[must_use]
pub fn decode(token: &str) -> u64 {
    decode_strict(token).unwrap_or(0)
}

/// Parse a timestamp token, reporting malformed input.
///
/// Every `[` and `]` is removed first, so both `[01:02.03]` and `01:02.03`
/// are accepted.
///
/// # Errors
///
/// Returns [`CoreError::InvalidTimestamp`] if the token is missing a
/// separator, has a non-numeric field, or overflows.
pub fn decode_strict(token: &str) -> Result<u64> {
    let invalid = |reason: &str| CoreError::InvalidTimestamp {
        token: token.to_string(),
        reason: reason.to_string(),
    };

    let clean: String = token.chars().filter(|c| !matches!(c, '[' | ']')).collect();

    let (min_sec, centis) = split_exactly_two(&clean, '.')
        .ok_or_else(|| invalid("expected exactly one '.' separator"))?;
    let (minutes, seconds) = split_exactly_two(min_sec, ':')
        .ok_or_else(|| invalid("expected exactly one ':' separator"))?;

    let minutes = parse_field(minutes).ok_or_else(|| invalid("minutes are not a number"))?;
    let seconds = parse_field(seconds).ok_or_else(|| invalid("seconds are not a number"))?;
    let centis = parse_field(centis).ok_or_else(|| invalid("centiseconds are not a number"))?;

    minutes
        .checked_mul(MS_PER_MINUTE)
        .and_then(|ms| ms.checked_add(seconds.checked_mul(MS_PER_SECOND)?))
        .and_then(|ms| ms.checked_add(centis.checked_mul(MS_PER_CENTISECOND)?))
        .ok_or_else(|| invalid("value overflows"))
}

fn split_exactly_two(s: &str, sep: char) -> Option<(&str, &str)> {
    let (head, tail) = s.split_once(sep)?;
    if tail.contains(sep) {
        return None;
    }
    Some((head, tail))
}

fn parse_field(field: &str) -> Option<u64> {
    field.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_basic() {
        assert_eq!(encode(0), "[00:00.00]");
        assert_eq!(encode(1500), "[00:01.50]");
        assert_eq!(encode(4000), "[00:04.00]");
        assert_eq!(encode(83_450), "[01:23.45]");
    }

    #[test]
    fn test_encode_truncates_to_hundredths() {
        assert_eq!(encode(1509), "[00:01.50]");
        assert_eq!(encode(9), "[00:00.00]");
    }

    #[test]
    fn test_encode_minutes_grow_past_two_digits() {
        assert_eq!(encode(5_999_990), "[99:59.99]");
        assert_eq!(encode(6_000_000), "[100:00.00]");
        assert_eq!(encode(12_345_670), "[205:45.67]");
    }

    #[test]
    fn test_decode_basic() {
        assert_eq!(decode("[00:01.50]"), 1500);
        assert_eq!(decode("[01:23.45]"), 83_450);
        assert_eq!(decode("02:00.00"), 120_000);
    }

    #[test]
    fn test_decode_wide_minutes() {
        assert_eq!(decode("[100:00.00]"), 6_000_000);
    }

    #[test]
    fn test_round_trip_full_range() {
        for ms in (0..=5_999_990).step_by(10) {
            assert_eq!(decode(&encode(ms)), ms, "round trip failed for {ms}");
        }
    }

    #[test]
    fn test_round_trip_drops_sub_centisecond_digit() {
        assert_eq!(decode(&encode(1234)), 1230);
    }

    #[test]
    fn test_decode_malformed_falls_back_to_zero() {
        let malformed = [
            "",
            "[]",
            "garbage",
            "[00:01]",
            "[0001.50]",
            "[aa:01.50]",
            "[00:bb.50]",
            "[00:01.cc]",
            "[00:01.50.10]",
            "[00:01:02.50]",
            "[-1:01.50]",
            "[:01.50]",
            "[00:.50]",
            "[00:01.]",
            "[99999999999999999999:00.00]",
            "--:--.--",
        ];
        for token in malformed {
            assert_eq!(decode(token), 0, "expected 0 for {token:?}");
        }
    }

    #[test]
    fn test_decode_strict_reports_failure() {
        let err = decode_strict("[00:01]").unwrap_err();
        assert!(matches!(err, CoreError::InvalidTimestamp { ref token, .. } if token == "[00:01]"));

        assert!(decode_strict("[xx:01.50]").is_err());
        assert!(decode_strict(UNSYNCED_PLACEHOLDER).is_err());
    }

    #[test]
    fn test_decode_strict_accepts_valid() {
        assert_eq!(decode_strict("[00:04.00]").unwrap(), 4000);
        assert_eq!(decode_strict(" 00 : 04 . 00 ").unwrap(), 4000);
    }

    #[test]
    fn test_decode_ignores_stray_brackets() {
        // Brackets are stripped wherever they appear.
        assert_eq!(decode("[[00:01.50]]"), 1500);
        assert_eq!(decode("00:0[1.5]0"), 1500);
    }
}
