//! Overlays drawn on top of a resource screen, plus shared drawing helpers.

pub mod confirm;
pub mod filter;
pub mod form;
pub mod input;

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders};

use crate::theme;

/// What a key did inside an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKey {
    Consumed,
    Submit,
    Cancel,
    /// Restore defaults (filter panel only).
    Reset,
}

/// A `width`×`height` rect centered in `area`, shrunk to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width.saturating_sub(4));
    let h = height.min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(w) / 2;
    let y = area.y + area.height.saturating_sub(h) / 2;
    Rect::new(x, y, w, h)
}

pub fn overlay_block(title: &str) -> Block<'static> {
    Block::default()
        .title(format!(" {title} "))
        .title_style(
            Style::default()
                .fg(theme::ELECTRIC_YELLOW)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(theme::ELECTRIC_PURPLE))
        .style(Style::default().bg(theme::BG_DARK))
}

/// `key action  key action` hint line.
pub fn hints(pairs: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(pairs.len() * 2 + 1);
    spans.push(Span::raw(" "));
    for (key, label) in pairs {
        spans.push(Span::styled(*key, theme::key_hint_key()));
        spans.push(Span::styled(format!(" {label}  "), theme::key_hint()));
    }
    Line::from(spans)
}

/// Line offset that keeps `focused_line` inside a viewport of `height` rows.
pub fn scroll_offset(focused_line: usize, height: u16) -> u16 {
    let visible = usize::from(height.max(1));
    let offset = (focused_line + 1).saturating_sub(visible);
    u16::try_from(offset).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_fits_inside_small_areas() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered(area, 80, 30);
        assert_eq!(rect.width, 36);
        assert_eq!(rect.height, 8);
        assert_eq!(rect.x, 2);
        assert_eq!(rect.y, 1);
    }

    #[test]
    fn scroll_keeps_focus_visible() {
        assert_eq!(scroll_offset(0, 5), 0);
        assert_eq!(scroll_offset(4, 5), 0);
        assert_eq!(scroll_offset(7, 5), 3);
    }
}
