use super::LyricView;
use crate::time::format_time;
use crate::track::LyricLine;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.left + self.width
            && point.y >= self.top
            && point.y <= self.top + self.height
    }
}

/// How a line should be painted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    /// The playback line
    Current,
    /// The line under the preview guide
    PreviewCenter,
    Normal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameLine<'a> {
    pub index: usize,
    pub line: &'a LyricLine,
    /// Vertical center of the line in viewport coordinates
    pub center_y: f32,
    pub height: f32,
    pub role: LineRole,
}

/// Preview guide across the viewport center
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineOverlay {
    pub center_line: usize,
    pub guide_y: f32,
    /// Start time of the centered line as `mm:ss`
    pub time_label: String,
    pub seek_control: Rect,
}

/// Everything the drawing layer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct LyricFrame<'a> {
    pub offset: f32,
    /// Visible lines, top to bottom
    pub lines: Vec<FrameLine<'a>>,
    pub timeline: Option<TimelineOverlay>,
    /// Set instead of `lines` when there is nothing to show
    pub empty_label: Option<&'a str>,
}

impl LyricView {
    /// Hit region of the seek control: a square centered in the left band,
    /// vertically on the viewport center
    #[must_use]
    pub fn seek_control(&self) -> Rect {
        let size = self.view.seek_control_size;
        Rect {
            left: (self.view.time_label_width - size) / 2.0,
            top: self.height / 2.0 - size / 2.0,
            width: size,
            height: size,
        }
    }

    /// Lay out the current frame
    pub fn frame(&mut self) -> LyricFrame<'_> {
        let offset = self.offset;
        let half_height = self.height / 2.0;

        if !self.offsets.is_measured(self.track.len()) {
            // A loaded track waiting for its first width shows nothing yet
            return LyricFrame {
                offset,
                lines: Vec::new(),
                timeline: None,
                empty_label: self.track.is_empty().then_some(self.label.as_str()),
            };
        }

        let previewing = self.is_previewing();
        let center = self.offsets.center_line(offset);
        let timeline = previewing.then(|| TimelineOverlay {
            center_line: center,
            guide_y: half_height,
            time_label: self
                .track
                .get(center)
                .map_or_else(|| format_time(0), |line| format_time(line.start_ms)),
            seek_control: self.seek_control(),
        });

        let mut lines = Vec::new();
        for (index, line) in self.track.lines().iter().enumerate() {
            let (Some(line_offset), Some(height)) =
                (self.offsets.offset_of(index), self.offsets.height_of(index))
            else {
                break;
            };
            let center_y = offset + (half_height - line_offset);
            if center_y + height / 2.0 < 0.0 {
                continue;
            }
            if center_y - height / 2.0 > self.height {
                break;
            }
            let role = if previewing && index == center {
                LineRole::PreviewCenter
            } else if index == self.current_line {
                LineRole::Current
            } else {
                LineRole::Normal
            };
            lines.push(FrameLine {
                index,
                line,
                center_y,
                height,
                role,
            });
        }

        LyricFrame {
            offset,
            lines,
            timeline,
            empty_label: None,
        }
    }
}
