//! Create/edit form overlay.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph};

use portico_core::form::parse_flag;
use portico_core::{FieldKind, FieldSpec, FormModal, RecordForm, Resource};

use super::input::{FieldEditor, cycle_choice};
use super::{OverlayKey, centered, hints, overlay_block, scroll_offset};
use crate::theme;

fn fields<R: Resource>() -> &'static [FieldSpec] {
    <R::Form as RecordForm>::fields()
}

fn text_of<R: Resource>(modal: &FormModal<R>, key: &str) -> String {
    modal.form().get(key).unwrap_or_default()
}

/// Load the first field into the editor after the modal opens.
pub fn begin<R: Resource>(modal: &FormModal<R>, editor: &mut FieldEditor) {
    let first = fields::<R>().first().map(|f| text_of(modal, f.key));
    editor.load(0, first.unwrap_or_default());
}

/// Write the editor's text into the focused field. Parse failures stay
/// on the modal as field errors.
pub fn commit<R: Resource>(modal: &mut FormModal<R>, editor: &FieldEditor) {
    if let Some(spec) = fields::<R>().get(editor.index()) {
        if matches!(spec.kind, FieldKind::Flag | FieldKind::Choice(_)) {
            return;
        }
        let _ = modal.set_field(spec.key, editor.value());
    }
}

fn focus<R: Resource>(modal: &mut FormModal<R>, editor: &mut FieldEditor, forward: bool) {
    let count = fields::<R>().len();
    if count == 0 {
        return;
    }
    commit(modal, editor);
    let next = if forward {
        (editor.index() + 1) % count
    } else {
        (editor.index() + count - 1) % count
    };
    let text = fields::<R>()
        .get(next)
        .map(|f| text_of(modal, f.key))
        .unwrap_or_default();
    editor.load(next, text);
}

/// Apply an immediate edit (flag toggle, choice step) and mirror it in
/// the editor.
fn apply<R: Resource>(modal: &mut FormModal<R>, editor: &mut FieldEditor, key: &str, raw: &str) {
    let _ = modal.set_field(key, raw);
    editor.set_value(text_of(modal, key));
}

pub fn handle_key<R: Resource>(
    modal: &mut FormModal<R>,
    editor: &mut FieldEditor,
    key: KeyEvent,
) -> OverlayKey {
    let Some(spec) = fields::<R>().get(editor.index()).copied() else {
        return match key.code {
            KeyCode::Esc => OverlayKey::Cancel,
            KeyCode::Enter => OverlayKey::Submit,
            _ => OverlayKey::Consumed,
        };
    };

    match key.code {
        KeyCode::Esc => return OverlayKey::Cancel,
        KeyCode::Enter => {
            commit(modal, editor);
            return OverlayKey::Submit;
        }
        KeyCode::Tab | KeyCode::Down => focus(modal, editor, true),
        KeyCode::BackTab | KeyCode::Up => focus(modal, editor, false),
        _ => match spec.kind {
            FieldKind::Flag => {
                if matches!(key.code, KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right) {
                    let current = parse_flag(editor.value()).unwrap_or(false);
                    apply(modal, editor, spec.key, if current { "false" } else { "true" });
                }
            }
            FieldKind::Choice(choices) => {
                let forward = match key.code {
                    KeyCode::Right | KeyCode::Char(' ') => Some(true),
                    KeyCode::Left => Some(false),
                    _ => None,
                };
                if let Some(forward) = forward {
                    let next = cycle_choice(editor.value(), choices, forward, !spec.required);
                    apply(modal, editor, spec.key, &next);
                }
            }
            _ => {
                editor.handle_key(key);
            }
        },
    }
    OverlayKey::Consumed
}

fn shown_value(spec: &FieldSpec, text: &str) -> String {
    match spec.kind {
        FieldKind::Flag => (if parse_flag(text).unwrap_or(false) { "Yes" } else { "No" }).into(),
        FieldKind::Secret => "•".repeat(text.chars().count()),
        FieldKind::Choice(_) if text.is_empty() => "—".into(),
        _ => text.replace('\n', " ⏎ "),
    }
}

fn kind_hint(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Flag => "space toggles",
        FieldKind::Choice(_) => "←/→ choose",
        FieldKind::DateTime => "YYYY-MM-DD HH:MM, blank for none",
        FieldKind::List => "comma separated",
        FieldKind::Reference => "id",
        _ => "",
    }
}

pub fn render<R: Resource>(
    frame: &mut Frame,
    area: Rect,
    modal: &FormModal<R>,
    editor: &FieldEditor,
) {
    let specs = fields::<R>();
    let mut lines: Vec<Line> = Vec::new();
    let mut focused_line = 0;

    for (idx, spec) in specs.iter().enumerate() {
        let is_focused = idx == editor.index();
        let label_style = theme::field_label(is_focused);
        let marker = if is_focused { "▸ " } else { "  " };
        let required = if spec.required { "*" } else { " " };

        let mut spans = vec![
            Span::styled(marker, label_style),
            Span::styled(format!("{:<14}", spec.label), label_style),
            Span::styled(format!("{required} "), theme::field_error()),
        ];

        let editable_text = !matches!(spec.kind, FieldKind::Flag | FieldKind::Choice(_));
        if is_focused && editable_text {
            focused_line = lines.len();
            spans.extend(editor.spans(
                theme::field_value(),
                Style::default().fg(theme::ELECTRIC_YELLOW),
                spec.kind == FieldKind::Secret,
            ));
        } else {
            if is_focused {
                focused_line = lines.len();
            }
            let text = if is_focused {
                editor.value().to_owned()
            } else {
                text_of(modal, spec.key)
            };
            let value = shown_value(spec, &text);
            let value = if is_focused && matches!(spec.kind, FieldKind::Choice(_)) {
                format!("‹ {value} ›")
            } else {
                value
            };
            spans.push(Span::styled(value, theme::field_value()));
        }
        if is_focused {
            let hint = kind_hint(spec.kind);
            if !hint.is_empty() {
                spans.push(Span::styled(format!("  {hint}"), theme::key_hint()));
            }
        }
        lines.push(Line::from(spans));

        if let Some(message) = modal.error(spec.key) {
            lines.push(Line::from(Span::styled(
                format!("                  ✗ {message}"),
                theme::field_error(),
            )));
        }
    }

    let total_lines = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let overlay = centered(area, 72, total_lines.saturating_add(5));
    frame.render_widget(Clear, overlay);

    let block = overlay_block(&modal.title());
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
            ("Enter", "save"),
            ("Ctrl-U", "clear field"),
            ("Esc", "cancel"),
        ])),
        footer,
    );
}
