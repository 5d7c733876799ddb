//! Time and duration conversion utilities.
//!
//! Playback positions travel through the engine as signed milliseconds so that
//! positions before the first line (including negative ones reported by some
//! players during pre-roll) resolve without special casing.

use std::time::Duration;

/// Extension trait for safe Duration conversions.
pub trait DurationExt {
    /// Convert duration to milliseconds as u64, saturating at `u64::MAX`.
    fn as_millis_u64(&self) -> u64;

    /// Convert duration to milliseconds as i64, saturating at `i64::MAX`.
    ///
    /// In practice, this is always safe because durations exceeding `i64::MAX`
    /// milliseconds would represent ~292 million years.
    fn as_millis_i64(&self) -> i64;
}

impl DurationExt for Duration {
    fn as_millis_u64(&self) -> u64 {
        u64::try_from(self.as_millis()).unwrap_or(u64::MAX)
    }

    fn as_millis_i64(&self) -> i64 {
        i64::try_from(self.as_millis()).unwrap_or(i64::MAX)
    }
}

/// Format a line timestamp as `mm:ss` for the preview time label.
///
/// Minutes are not wrapped at 60, so a two hour mix reads `120:00`.
#[must_use]
pub fn format_time(millis: u64) -> String {
    let total_secs = millis / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
