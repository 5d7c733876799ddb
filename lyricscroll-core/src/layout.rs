//! Text measurement used to size each lyric line.

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

/// Horizontal alignment of lyric text inside the layout width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Lays out a block of text and reports its height.
///
/// Consulted once per line whenever the viewport width becomes known or changes.
pub trait TextLayoutEngine {
    fn measure(&self, text: &str, width: f32, alignment: TextAlignment) -> f32;
}

/// Fixed-cell layout: every column is `cell_width` wide and every wrapped row
/// is `line_height` tall. Wide (CJK) characters take two columns.
///
/// Good enough for terminals and tests; GUI hosts plug in their own shaper.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceLayout {
    pub cell_width: f32,
    pub line_height: f32,
}

impl MonospaceLayout {
    #[must_use]
    pub const fn new(cell_width: f32, line_height: f32) -> Self {
        Self {
            cell_width,
            line_height,
        }
    }

    /// Rows needed for one paragraph when `columns` cells fit on a row
    fn rows(paragraph: &str, columns: usize) -> usize {
        let mut rows = 1;
        let mut used = 0;
        for ch in paragraph.chars() {
            let width = ch.width().unwrap_or(0);
            if used + width > columns && used > 0 {
                rows += 1;
                used = 0;
            }
            used += width;
        }
        rows
    }
}

impl TextLayoutEngine for MonospaceLayout {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn measure(&self, text: &str, width: f32, _alignment: TextAlignment) -> f32 {
        // Truncation is intended: a partial cell does not fit a glyph
        let columns = if self.cell_width > 0.0 {
            (width / self.cell_width).max(1.0) as usize
        } else {
            usize::MAX
        };
        let rows: usize = text.split('\n').map(|p| Self::rows(p, columns)).sum();
        rows as f32 * self.line_height
    }
}
