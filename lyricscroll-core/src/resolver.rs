//! Maps a playback position to the line that should be shown as current.

use crate::track::LyricLine;

/// Find the index of the last line whose timestamp is `<= position_ms`.
///
/// Returns 0 when the position precedes every line or the track is empty.
/// Lines must be sorted by timestamp; among equal timestamps the later one wins.
/// Runs in O(log n).
#[must_use]
pub fn resolve_line(lines: &[LyricLine], position_ms: i64) -> usize {
    let Ok(position) = u64::try_from(position_ms) else {
        return 0;
    };
    if lines.is_empty() {
        return 0;
    }

    let mut low = 0;
    let mut high = lines.len() - 1;
    while low <= high {
        let mid = low + (high - low) / 2;
        if position < lines[mid].start_ms {
            if mid == 0 {
                return 0;
            }
            high = mid - 1;
        } else if lines
            .get(mid + 1)
            .is_some_and(|next| next.start_ms <= position)
        {
            low = mid + 1;
        } else {
            return mid;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(timestamps: &[u64]) -> Vec<LyricLine> {
        timestamps
            .iter()
            .map(|&ts| LyricLine::new(ts, format!("at {ts}")))
            .collect()
    }

    /// Reference implementation: greatest index with timestamp <= position
    fn linear(lines: &[LyricLine], position_ms: i64) -> usize {
        lines
            .iter()
            .enumerate()
            .rev()
            .find(|(_, l)| i64::try_from(l.start_ms).unwrap_or(i64::MAX) <= position_ms)
            .map_or(0, |(i, _)| i)
    }

    #[test]
    fn test_resolve_examples() {
        let track = lines(&[0, 5_000, 12_000]);
        assert_eq!(resolve_line(&track, 7_000), 1);
        assert_eq!(resolve_line(&track, -100), 0);
        assert_eq!(resolve_line(&track, 12_000), 2);
        assert_eq!(resolve_line(&track, 4_999), 0);
        assert_eq!(resolve_line(&track, i64::MAX), 2);
    }

    #[test]
    fn test_resolve_before_first_line() {
        let track = lines(&[3_000, 6_000]);
        assert_eq!(resolve_line(&track, 0), 0);
        assert_eq!(resolve_line(&track, 2_999), 0);
    }

    #[test]
    fn test_resolve_empty_track() {
        assert_eq!(resolve_line(&[], 1_000), 0);
    }

    #[test]
    fn test_resolve_single_line() {
        let track = lines(&[2_000]);
        for position in [-5, 0, 1_999, 2_000, 99_999] {
            assert_eq!(resolve_line(&track, position), 0);
        }
    }

    #[test]
    fn test_resolve_duplicates_pick_last() {
        let track = lines(&[0, 5_000, 5_000, 5_000, 9_000]);
        assert_eq!(resolve_line(&track, 5_000), 3);
        assert_eq!(resolve_line(&track, 8_999), 3);
        assert_eq!(resolve_line(&track, 4_999), 0);
    }

    #[test]
    fn test_resolve_matches_linear_scan() {
        let sequences: [&[u64]; 5] = [
            &[0, 1, 2, 3, 4, 5, 6],
            &[100, 100, 100],
            &[10, 20, 20, 30, 40, 40, 40, 50],
            &[0, 0, 7, 7, 7, 7, 8, 100, 1_000],
            &[500, 1_500, 2_500, 3_500, 4_500, 5_500, 6_500, 7_500, 8_500],
        ];
        for timestamps in sequences {
            let track = lines(timestamps);
            for position in -10..1_100 {
                assert_eq!(
                    resolve_line(&track, position),
                    linear(&track, position),
                    "timestamps {timestamps:?} at {position}"
                );
            }
        }
    }
}
