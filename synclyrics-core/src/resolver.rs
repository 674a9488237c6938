//! Active line lookup for a playback position.

use crate::document::LyricDocument;

/// Find the line playing at `position_ms`.
///
/// Lines are scanned in document order. A synced line is active when
/// `start <= position < end`, where `end` is the next line's start or
/// open-ended if the next line is unsynced or missing. The first match wins,
/// so out-of-order timestamps still resolve deterministically.
///
/// Pure: safe to poll on every timer tick.
#[must_use]
pub fn resolve_active(document: &LyricDocument, position_ms: u64) -> Option<usize> {
    document.lines().find_map(|line| {
        let start = line.start_ms()?;
        let index = line.index();
        let before_end = document
            .effective_end(index)
            .map_or(true, |end| position_ms < end);
        (start <= position_ms && before_end).then_some(index)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synced(starts: &[Option<u64>]) -> LyricDocument {
        LyricDocument::from_timed(
            starts
                .iter()
                .enumerate()
                .map(|(i, s)| (format!("Line {}", i + 1), *s)),
        )
    }

    #[test]
    fn test_no_synced_lines() {
        let d = synced(&[None, None]);
        assert_eq!(resolve_active(&d, 0), None);
        assert_eq!(resolve_active(&d, 10_000), None);
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(resolve_active(&LyricDocument::default(), 500), None);
    }

    #[test]
    fn test_before_first_marked_line() {
        let d = synced(&[Some(5000), Some(10_000)]);
        assert_eq!(resolve_active(&d, 4999), None);
    }

    #[test]
    fn test_between_lines() {
        let d = synced(&[Some(5000), Some(10_000), Some(15_000)]);
        assert_eq!(resolve_active(&d, 5000), Some(0));
        assert_eq!(resolve_active(&d, 7000), Some(0));
        assert_eq!(resolve_active(&d, 10_000), Some(1));
        assert_eq!(resolve_active(&d, 14_999), Some(1));
    }

    #[test]
    fn test_last_line_is_open_ended() {
        let d = synced(&[Some(5000), Some(10_000)]);
        assert_eq!(resolve_active(&d, 600_000), Some(1));
    }

    #[test]
    fn test_unsynced_successor_leaves_line_open() {
        let d = synced(&[Some(1000), None, Some(9000)]);
        assert_eq!(resolve_active(&d, 20_000), Some(0));
    }

    #[test]
    fn test_out_of_order_first_match_wins() {
        // Line 0 marked late, line 1 marked early.
        let d = synced(&[Some(8000), Some(2000), None]);
        // Line 0: [8000, 2000) is empty; line 1 is open-ended from 2000.
        assert_eq!(resolve_active(&d, 1000), None);
        assert_eq!(resolve_active(&d, 3000), Some(1));
        assert_eq!(resolve_active(&d, 9000), Some(1));

        // Both open ranges overlap: document order decides.
        let d = synced(&[Some(8000), None, Some(2000)]);
        assert_eq!(resolve_active(&d, 9000), Some(0));
        assert_eq!(resolve_active(&d, 3000), Some(2));
    }

    #[test]
    fn test_zero_length_line_is_skipped() {
        let d = synced(&[Some(3000), Some(3000), Some(6000)]);
        assert_eq!(resolve_active(&d, 3000), Some(1));
    }

    #[test]
    fn test_resolve_is_pure() {
        let d = synced(&[Some(1000), Some(2000)]);
        let before = d.clone();
        let first = resolve_active(&d, 1500);
        let second = resolve_active(&d, 1500);
        assert_eq!(first, second);
        assert_eq!(d, before);
    }
}
