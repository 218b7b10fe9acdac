//! Single-line text editing for overlay fields.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::Style;
use ratatui::text::Span;
use tui_input::{Input, InputRequest};

/// Which field of an overlay has focus, and its uncommitted text.
#[derive(Debug, Default)]
pub struct FieldEditor {
    index: usize,
    input: Input,
}

impl FieldEditor {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    /// Focus field `index` with `text` as its starting value.
    pub fn load(&mut self, index: usize, text: String) {
        self.index = index;
        self.input = Input::new(text);
    }

    /// Replace the text, keeping focus.
    pub fn set_value(&mut self, text: String) {
        self.input = Input::new(text);
    }

    /// Apply a text-editing key. Returns false for keys it does not own.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let request = match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                InputRequest::InsertChar(c)
            }
            KeyCode::Char('w') => InputRequest::DeletePrevWord,
            KeyCode::Char('u') => InputRequest::DeleteLine,
            KeyCode::Backspace => InputRequest::DeletePrevChar,
            KeyCode::Delete => InputRequest::DeleteNextChar,
            KeyCode::Left => InputRequest::GoToPrevChar,
            KeyCode::Right => InputRequest::GoToNextChar,
            KeyCode::Home => InputRequest::GoToStart,
            KeyCode::End => InputRequest::GoToEnd,
            _ => return false,
        };
        self.input.handle(request);
        true
    }

    /// The text split around a block cursor, ready to render.
    pub fn spans(&self, style: Style, cursor_style: Style, masked: bool) -> Vec<Span<'static>> {
        let text: String = if masked {
            "•".repeat(self.input.value().chars().count())
        } else {
            self.input.value().to_owned()
        };
        let split = text
            .char_indices()
            .nth(self.input.cursor())
            .map_or(text.len(), |(i, _)| i);
        let (before, after) = text.split_at(split);
        vec![
            Span::styled(before.to_owned(), style),
            Span::styled("▎", cursor_style),
            Span::styled(after.to_owned(), style),
        ]
    }
}

/// Step through `choices`, optionally passing through a blank entry.
pub fn cycle_choice(current: &str, choices: &[&str], forward: bool, allow_blank: bool) -> String {
    let mut options: Vec<&str> = Vec::with_capacity(choices.len() + 1);
    if allow_blank {
        options.push("");
    }
    options.extend_from_slice(choices);
    if options.is_empty() {
        return current.to_owned();
    }

    let len = options.len();
    let position = options
        .iter()
        .position(|o| o.eq_ignore_ascii_case(current.trim()));
    let next = match (position, forward) {
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
        (None, true) => 0,
        (None, false) => len - 1,
    };
    options.get(next).map_or_else(String::new, |o| (*o).to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_and_backspace() {
        let mut editor = FieldEditor::default();
        editor.load(2, "Flo".into());
        assert!(editor.handle_key(key(KeyCode::Char('o'))));
        assert!(editor.handle_key(key(KeyCode::Char('d'))));
        assert!(editor.handle_key(key(KeyCode::Backspace)));
        assert_eq!(editor.value(), "Floo");
        assert_eq!(editor.index(), 2);
        assert!(!editor.handle_key(key(KeyCode::Enter)));
    }

    #[test]
    fn ctrl_u_clears_the_line() {
        let mut editor = FieldEditor::default();
        editor.load(0, "draft title".into());
        assert!(editor.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)));
        assert_eq!(editor.value(), "");
    }

    #[test]
    fn choices_cycle_with_optional_blank() {
        let choices = &["Low", "High"];
        assert_eq!(cycle_choice("low", choices, true, false), "High");
        assert_eq!(cycle_choice("High", choices, true, false), "Low");
        assert_eq!(cycle_choice("High", choices, true, true), "");
        assert_eq!(cycle_choice("", choices, false, true), "High");
        assert_eq!(cycle_choice("bogus", choices, true, false), "Low");
    }
}
