//! Line index to scroll offset geometry.
//!
//! The offset of a line is the viewport offset at which that line sits exactly
//! on the vertical center of the viewport:
//!
//! ```text
//! offset(0) = viewport_height / 2
//! offset(i) = offset(i - 1) - (height(i - 1) + height(i)) / 2 - gap
//! ```
//!
//! Offsets are cumulative from line 0, so the cache is a prefix that is
//! extended on demand and dropped wholesale whenever any input changes.

/// Memoized offset model over measured line heights.
#[derive(Debug, Clone, Default)]
pub struct OffsetModel {
    viewport_height: f32,
    gap: f32,
    heights: Vec<f32>,
    offsets: Vec<f32>,
}

impl OffsetModel {
    #[must_use]
    pub const fn new(gap: f32) -> Self {
        Self {
            viewport_height: 0.0,
            gap,
            heights: Vec::new(),
            offsets: Vec::new(),
        }
    }

    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height;
        self.invalidate();
    }

    /// Install freshly measured heights, one per line in track order
    pub fn set_heights(&mut self, heights: Vec<f32>) {
        self.heights = heights;
        self.invalidate();
    }

    /// Forget all measurements (new track, or width no longer known)
    pub fn clear_heights(&mut self) {
        self.heights.clear();
        self.invalidate();
    }

    /// Whether every one of `line_count` lines has a measured height
    #[must_use]
    pub fn is_measured(&self, line_count: usize) -> bool {
        line_count > 0 && self.heights.len() == line_count
    }

    #[must_use]
    pub fn height_of(&self, line: usize) -> Option<f32> {
        self.heights.get(line).copied()
    }

    /// Number of offsets currently memoized
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.offsets.len()
    }

    /// Scroll offset that centers `line`, or `None` if the line has no measured height
    pub fn offset_of(&mut self, line: usize) -> Option<f32> {
        if line >= self.heights.len() {
            return None;
        }
        if self.offsets.is_empty() {
            self.offsets.push(self.viewport_height / 2.0);
        }
        while self.offsets.len() <= line {
            let next = self.offsets.len();
            let previous = self.offsets[next - 1];
            let step = (self.heights[next - 1] + self.heights[next]) / 2.0 + self.gap;
            self.offsets.push(previous - step);
        }
        Some(self.offsets[line])
    }

    /// Valid drag/fling range as `(min, max)`: the last line's offset up to the first line's
    pub fn scroll_bounds(&mut self) -> Option<(f32, f32)> {
        let last = self.heights.len().checked_sub(1)?;
        let max = self.offset_of(0)?;
        let min = self.offset_of(last)?;
        Some((min, max))
    }

    /// The line whose offset is nearest to `offset`; the earlier line wins ties.
    ///
    /// Linear scan, only called on discrete interaction events.
    pub fn center_line(&mut self, offset: f32) -> usize {
        let mut center = 0;
        let mut min_distance = f32::MAX;
        for line in 0..self.heights.len() {
            let Some(line_offset) = self.offset_of(line) else {
                break;
            };
            let distance = (offset - line_offset).abs();
            if distance < min_distance {
                min_distance = distance;
                center = line;
            }
        }
        center
    }

    fn invalidate(&mut self) {
        self.offsets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(viewport_height: f32, gap: f32, heights: &[f32]) -> OffsetModel {
        let mut model = OffsetModel::new(gap);
        model.set_viewport_height(viewport_height);
        model.set_heights(heights.to_vec());
        model
    }

    #[test]
    fn test_offset_of_first_line_is_half_viewport() {
        let mut model = model(400.0, 10.0, &[20.0, 20.0]);
        assert_eq!(model.offset_of(0), Some(200.0));
    }

    #[test]
    fn test_offset_recurrence() {
        let mut model = model(400.0, 10.0, &[20.0, 40.0, 30.0]);
        // 200 - (20 + 40) / 2 - 10
        assert_eq!(model.offset_of(1), Some(160.0));
        // 160 - (40 + 30) / 2 - 10
        assert_eq!(model.offset_of(2), Some(115.0));
    }

    #[test]
    fn test_offset_unmeasured_line() {
        let mut model = model(400.0, 10.0, &[20.0]);
        assert_eq!(model.offset_of(1), None);
        assert_eq!(OffsetModel::new(10.0).offset_of(0), None);
    }

    #[test]
    fn test_offset_strictly_decreasing() {
        let heights = [18.0, 36.0, 18.0, 54.0, 18.0, 18.0, 72.0];
        let mut model = model(600.0, 12.0, &heights);
        let offsets: Vec<f32> = (0..heights.len())
            .filter_map(|i| model.offset_of(i))
            .collect();
        assert_eq!(offsets.len(), heights.len());
        assert!(offsets.windows(2).all(|pair| pair[1] < pair[0]));
    }

    #[test]
    fn test_memoized_offsets_are_bit_identical() {
        let mut model = model(500.0, 7.5, &[21.3, 19.7, 44.1, 23.9]);
        let first = model.offset_of(3).map(f32::to_bits);
        let second = model.offset_of(3).map(f32::to_bits);
        assert_eq!(first, second);
        assert_eq!(model.cached_len(), 4);
    }

    #[test]
    fn test_lazy_prefix_only_computes_requested_lines() {
        let mut model = model(500.0, 10.0, &[20.0; 10]);
        assert_eq!(model.cached_len(), 0);
        model.offset_of(3);
        assert_eq!(model.cached_len(), 4);
    }

    #[test]
    fn test_viewport_change_invalidates_all_offsets() {
        let mut model = model(400.0, 10.0, &[20.0, 20.0, 20.0]);
        let before = model.offset_of(2);
        assert_eq!(model.cached_len(), 3);

        model.set_viewport_height(600.0);
        assert_eq!(model.cached_len(), 0);

        let after = model.offset_of(2);
        assert_eq!(before, Some(140.0));
        assert_eq!(after, Some(240.0));
    }

    #[test]
    fn test_height_change_invalidates_all_offsets() {
        let mut model = model(400.0, 10.0, &[20.0, 20.0, 20.0]);
        model.offset_of(2);
        model.set_heights(vec![20.0, 60.0, 20.0]);
        assert_eq!(model.cached_len(), 0);
        assert_eq!(model.offset_of(2), Some(100.0));
    }

    #[test]
    fn test_scroll_bounds() {
        let mut model = model(400.0, 10.0, &[20.0, 20.0, 20.0]);
        assert_eq!(model.scroll_bounds(), Some((140.0, 200.0)));
        assert_eq!(OffsetModel::new(0.0).scroll_bounds(), None);
    }

    #[test]
    fn test_center_line_nearest() {
        let mut model = model(400.0, 10.0, &[20.0, 20.0, 20.0, 20.0]);
        // offsets: 200, 170, 140, 110
        assert_eq!(model.center_line(205.0), 0);
        assert_eq!(model.center_line(172.0), 1);
        assert_eq!(model.center_line(120.0), 3);
        assert_eq!(model.center_line(-1_000.0), 3);
        // Exactly between lines 1 and 2 resolves to the earlier line
        assert_eq!(model.center_line(155.0), 1);
    }

    #[test]
    fn test_is_measured() {
        let model = model(400.0, 10.0, &[20.0, 20.0]);
        assert!(model.is_measured(2));
        assert!(!model.is_measured(3));
        assert!(!OffsetModel::new(0.0).is_measured(0));
    }
}
