//! Filter panel overlay. Edits a draft; nothing reaches the list until
//! it is applied.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph};

use portico_core::{FilterField, FilterKind, FilterPanel};

use super::input::{FieldEditor, cycle_choice};
use super::{OverlayKey, centered, hints, overlay_block, scroll_offset};
use crate::theme;

const FLAG_CHOICES: &[&str] = &["yes", "no"];

/// Load the first field into the editor after the panel opens.
pub fn begin(panel: &FilterPanel, editor: &mut FieldEditor) {
    let first = panel.fields().first().map(|f| panel.value_text(f.key));
    editor.load(0, first.unwrap_or_default());
}

/// Parse the editor's text into the draft. Returns the parse error, if
/// any, so the caller can keep the panel open.
pub fn commit(panel: &mut FilterPanel, editor: &FieldEditor) -> Result<(), String> {
    match panel.fields().get(editor.index()) {
        Some(field) => panel.set_raw(field.key, editor.value()),
        None => Ok(()),
    }
}

fn is_stepped(kind: FilterKind) -> bool {
    matches!(kind, FilterKind::Choice(_) | FilterKind::Flag)
}

pub fn handle_key(
    panel: &mut FilterPanel,
    editor: &mut FieldEditor,
    error: &mut Option<String>,
    key: KeyEvent,
) -> OverlayKey {
    let fields = panel.fields();
    let Some(field) = fields.get(editor.index()).copied() else {
        return OverlayKey::Cancel;
    };

    match key.code {
        KeyCode::Esc => return OverlayKey::Cancel,
        KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return OverlayKey::Reset;
        }
        KeyCode::Enter => {
            return match commit(panel, editor) {
                Ok(()) => OverlayKey::Submit,
                Err(message) => {
                    *error = Some(message);
                    OverlayKey::Consumed
                }
            };
        }
        KeyCode::Tab | KeyCode::Down | KeyCode::BackTab | KeyCode::Up => {
            if let Err(message) = commit(panel, editor) {
                *error = Some(message);
                return OverlayKey::Consumed;
            }
            *error = None;
            let count = fields.len();
            let next = if matches!(key.code, KeyCode::Tab | KeyCode::Down) {
                (editor.index() + 1) % count
            } else {
                (editor.index() + count - 1) % count
            };
            let text = fields.get(next).map(|f| panel.value_text(f.key)).unwrap_or_default();
            editor.load(next, text);
        }
        _ if is_stepped(field.kind) => {
            let forward = match key.code {
                KeyCode::Right | KeyCode::Char(' ') => true,
                KeyCode::Left => false,
                _ => return OverlayKey::Consumed,
            };
            let choices = match field.kind {
                FilterKind::Choice(choices) => choices,
                _ => FLAG_CHOICES,
            };
            editor.set_value(cycle_choice(editor.value(), choices, forward, true));
            *error = None;
        }
        _ => {
            if editor.handle_key(key) {
                *error = None;
            }
        }
    }
    OverlayKey::Consumed
}

fn kind_hint(kind: FilterKind) -> &'static str {
    match kind {
        FilterKind::Choice(_) | FilterKind::Flag => "←/→ choose",
        FilterKind::Date => "YYYY-MM-DD",
        FilterKind::DateRange { .. } => "from..to",
        FilterKind::List => "comma separated",
        FilterKind::Number => "number",
        _ => "",
    }
}

fn shown(field: &FilterField, text: &str, focused: bool) -> String {
    if is_stepped(field.kind) {
        let value = if text.is_empty() { "any" } else { text };
        if focused { format!("‹ {value} ›") } else { value.to_owned() }
    } else {
        text.to_owned()
    }
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    panel: &FilterPanel,
    editor: &FieldEditor,
    error: Option<&str>,
) {
    let mut lines: Vec<Line> = Vec::new();
    let mut focused_line = 0;

    for (idx, field) in panel.fields().iter().enumerate() {
        let is_focused = idx == editor.index();
        let label_style = theme::field_label(is_focused);
        let marker = if is_focused { "▸ " } else { "  " };
        let mut spans = vec![
            Span::styled(marker, label_style),
            Span::styled(format!("{:<16}", field.label), label_style),
        ];

        if is_focused {
            focused_line = lines.len();
            if is_stepped(field.kind) {
                spans.push(Span::styled(
                    shown(field, editor.value(), true),
                    theme::field_value(),
                ));
            } else {
                spans.extend(editor.spans(
                    theme::field_value(),
                    Style::default().fg(theme::ELECTRIC_YELLOW),
                    false,
                ));
            }
            let hint = kind_hint(field.kind);
            if !hint.is_empty() {
                spans.push(Span::styled(format!("  {hint}"), theme::key_hint()));
            }
        } else {
            spans.push(Span::styled(
                shown(field, &panel.value_text(field.key), false),
                theme::field_value(),
            ));
        }
        lines.push(Line::from(spans));

        if is_focused {
            if let Some(message) = error {
                lines.push(Line::from(Span::styled(
                    format!("                  ✗ {message}"),
                    theme::field_error(),
                )));
            }
        }
    }

    let total_lines = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let overlay = centered(area, 64, total_lines.saturating_add(5));
    frame.render_widget(Clear, overlay);

    let block = overlay_block("Filters");
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let body_height = inner.height.saturating_sub(2);
    let body = Rect::new(inner.x, inner.y, inner.width, body_height);
    let footer = Rect::new(inner.x, inner.y + body_height + 1, inner.width, 1);

    frame.render_widget(
        Paragraph::new(lines).scroll((scroll_offset(focused_line, body_height), 0)),
        body,
    );
    frame.render_widget(
        Paragraph::new(hints(&[
            ("Tab", "next"),
            ("Enter", "apply"),
            ("Ctrl-R", "reset"),
            ("Esc", "discard"),
        ])),
        footer,
    );
}
