//! Confirmation overlay for delete and lifecycle transitions.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph, Wrap};

use portico_core::{ConfirmInput, ConfirmModal, RowAction};

use super::input::FieldEditor;
use super::{OverlayKey, centered, hints, overlay_block};
use crate::theme;

pub fn begin(modal: &ConfirmModal, editor: &mut FieldEditor) {
    editor.load(0, modal.input().to_owned());
}

pub fn handle_key(modal: &mut ConfirmModal, editor: &mut FieldEditor, key: KeyEvent) -> OverlayKey {
    if modal.input_kind().is_some() {
        return match key.code {
            KeyCode::Esc => OverlayKey::Cancel,
            KeyCode::Enter => {
                modal.set_input(editor.value());
                OverlayKey::Submit
            }
            _ => {
                if editor.handle_key(key) {
                    modal.set_input(editor.value());
                }
                OverlayKey::Consumed
            }
        };
    }

    match key.code {
        KeyCode::Char('y' | 'Y') | KeyCode::Enter => OverlayKey::Submit,
        KeyCode::Char('n' | 'N') | KeyCode::Esc => OverlayKey::Cancel,
        _ => OverlayKey::Consumed,
    }
}

fn input_label(kind: ConfirmInput) -> &'static str {
    match kind {
        ConfirmInput::PublishAt => "Publish at (blank = now)",
        ConfirmInput::PinOrder => "Pin order (1-9999)",
    }
}

pub fn render(frame: &mut Frame, area: Rect, modal: &ConfirmModal, editor: &FieldEditor) {
    let height = if modal.input_kind().is_some() { 10 } else { 7 };
    let overlay = centered(area, 56, height);
    frame.render_widget(Clear, overlay);

    let title = if modal.action() == RowAction::Delete {
        "Confirm delete"
    } else {
        "Confirm"
    };
    let block = overlay_block(title);
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let prompt_style = if modal.action() == RowAction::Delete {
        Style::default()
            .fg(theme::CORAL)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(theme::DIM_WHITE)
            .add_modifier(Modifier::BOLD)
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(modal.prompt(), prompt_style)),
        Line::from(""),
    ];

    if let Some(kind) = modal.input_kind() {
        let mut spans = vec![Span::styled(
            format!("{}: ", input_label(kind)),
            theme::field_label(true),
        )];
        spans.extend(editor.spans(
            theme::field_value(),
            Style::default().fg(theme::ELECTRIC_YELLOW),
            false,
        ));
        lines.push(Line::from(spans));
        if let Some(message) = modal.error() {
            lines.push(Line::from(Span::styled(
                format!("✗ {message}"),
                theme::field_error(),
            )));
        } else {
            lines.push(Line::from(""));
        }
        lines.push(hints(&[("Enter", "confirm"), ("Esc", "cancel")]));
    } else {
        lines.push(hints(&[("y", "confirm"), ("n", "cancel")]));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        inner,
    );
}
