//! Hero line widget.
//!
//! Draws the typewriter's revealed prefix centered on a single row, followed
//! by a caret while the reveal is still running. The widget is pure: it reads
//! a [`TypewriterState`] snapshot and never touches the engine.

use crate::typewriter::TypewriterState;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

/// Caret glyph drawn after the revealed text.
pub const CARET: &str = "▌";

/// Single-row hero headline.
#[derive(Debug, Clone)]
pub struct HeroLine<'a> {
    state: &'a TypewriterState,
    style: Style,
    caret_style: Style,
}

impl<'a> HeroLine<'a> {
    /// Hero line for a typewriter snapshot.
    pub fn new(state: &'a TypewriterState) -> Self {
        Self {
            state,
            style: Style::default().add_modifier(Modifier::BOLD),
            caret_style: Style::default().fg(Color::Gray),
        }
    }

    /// Override the text style.
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Override the caret style.
    pub fn caret_style(mut self, style: Style) -> Self {
        self.caret_style = style;
        self
    }

    /// Display width in terminal columns, caret included.
    pub fn width(&self) -> usize {
        let caret = if self.state.show_caret() {
            CARET.width()
        } else {
            0
        };
        self.state.revealed().width() + caret
    }

    fn line(&self) -> Line<'a> {
        let mut spans = vec![Span::styled(self.state.revealed(), self.style)];
        if self.state.show_caret() {
            spans.push(Span::styled(CARET, self.caret_style));
        }
        Line::from(spans)
    }
}

impl Widget for HeroLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let width = u16::try_from(self.width()).unwrap_or(u16::MAX);
        let left_pad = area.width.saturating_sub(width) / 2;
        let x = area.x + left_pad;
        buf.set_line(x, area.y, &self.line(), area.width - left_pad);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typewriter::Phase;

    fn snapshot(text: &str, revealed_len: usize, phase: Phase, reduced_motion: bool) -> TypewriterState {
        TypewriterState {
            source_text: text.to_string(),
            revealed_len,
            phase,
            reduced_motion,
        }
    }

    fn row(buf: &Buffer, y: u16) -> String {
        let area = buf.area();
        (area.left()..area.right())
            .map(|x| buf[(x, y)].symbol())
            .collect()
    }

    #[test]
    fn revealing_line_is_centered_with_caret() {
        let state = snapshot("Hello", 2, Phase::Revealing, false);
        let area = Rect::new(0, 0, 11, 1);
        let mut buf = Buffer::empty(area);

        HeroLine::new(&state).render(area, &mut buf);

        // "He" + caret is three columns wide, padded by four on the left.
        assert_eq!(row(&buf, 0), "    He▌    ");
    }

    #[test]
    fn complete_line_has_no_caret() {
        let state = snapshot("Hi", 2, Phase::Complete, false);
        let area = Rect::new(0, 0, 6, 1);
        let mut buf = Buffer::empty(area);

        HeroLine::new(&state).render(area, &mut buf);

        assert_eq!(row(&buf, 0), "  Hi  ");
    }

    #[test]
    fn reduced_motion_hides_caret() {
        let state = snapshot("Hi", 2, Phase::Complete, true);
        assert!(!state.show_caret());
        assert_eq!(HeroLine::new(&state).width(), 2);
    }

    #[test]
    fn wide_characters_are_measured_by_display_width() {
        let state = snapshot("日本", 2, Phase::Complete, false);
        assert_eq!(HeroLine::new(&state).width(), 4);
    }

    #[test]
    fn line_wider_than_area_is_clipped_from_the_left_edge() {
        let state = snapshot("abcdefgh", 8, Phase::Complete, false);
        let area = Rect::new(0, 0, 4, 1);
        let mut buf = Buffer::empty(area);

        HeroLine::new(&state).render(area, &mut buf);

        assert_eq!(row(&buf, 0), "abcd");
    }

    #[test]
    fn caret_uses_caret_style() {
        let state = snapshot("a", 0, Phase::Revealing, false);
        let area = Rect::new(0, 0, 1, 1);
        let mut buf = Buffer::empty(area);

        HeroLine::new(&state)
            .caret_style(Style::default().fg(Color::Red))
            .render(area, &mut buf);

        assert_eq!(buf[(0, 0)].symbol(), CARET);
        assert_eq!(buf[(0, 0)].fg, Color::Red);
    }
}
