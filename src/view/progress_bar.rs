//! Reading-progress bar widget.
//!
//! Paints a [`ProgressBar`] description onto the top row of its area: a
//! full-width track with the first `round(width * fill / 100)` cells filled.

use crate::progress::ProgressBar;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Glyph for filled cells.
pub const FILL_SYMBOL: &str = "█";

/// Glyph for the unfilled track.
pub const TRACK_SYMBOL: &str = "░";

/// Track color.
const TRACK_COLOR: Color = Color::DarkGray;

/// Widget drawing a [`ProgressBar`].
#[derive(Debug, Clone, Copy)]
pub struct ProgressBarWidget<'a> {
    bar: &'a ProgressBar,
}

impl<'a> ProgressBarWidget<'a> {
    /// Widget for `bar`.
    pub fn new(bar: &'a ProgressBar) -> Self {
        Self { bar }
    }
}

/// Number of filled cells for a track of `width` cells.
pub fn filled_cells(width: u16, fill_percent: u8) -> u16 {
    let percent = u32::from(fill_percent.min(100));
    let cells = (u32::from(width) * percent + 50) / 100;
    // At most `width`, so it fits.
    cells as u16
}

impl Widget for ProgressBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let filled = filled_cells(area.width, self.bar.fill_percent);
        let y = area.top();
        for (i, x) in (area.left()..area.right()).enumerate() {
            let cell = &mut buf[(x, y)];
            if i < usize::from(filled) {
                cell.set_symbol(FILL_SYMBOL)
                    .set_style(Style::default().fg(self.bar.color));
            } else {
                cell.set_symbol(TRACK_SYMBOL)
                    .set_style(Style::default().fg(TRACK_COLOR));
            }
        }
    }
}
