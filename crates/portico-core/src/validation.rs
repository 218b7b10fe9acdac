// ── Client-side validation ──
//
// Per-field messages collected before a write reaches the network, merged
// with whatever field errors the server sends back after it.

use std::collections::BTreeMap;
use std::fmt;

use portico_api::FieldErrors;

/// Field key → messages. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    /// First message for `field`, matched case-insensitively so server keys
    /// like `Title` land on the form's `title`.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(field))
            .and_then(|(_, v)| v.first())
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn clear_field(&mut self, field: &str) {
        self.0.retain(|k, _| !k.eq_ignore_ascii_case(field));
    }

    pub fn into_inner(self) -> FieldErrors {
        self.0
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Like `merge`, but each field in `other` replaces what was there.
    pub fn overwrite(&mut self, other: ValidationErrors) {
        for (field, messages) in other.0 {
            self.clear_field(&field);
            self.0.insert(field, messages);
        }
    }

    // ── Rule helpers ─────────────────────────────────────────────────

    pub fn require(&mut self, field: &str, label: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, format!("{label} is required"));
        }
    }

    pub fn max_len(&mut self, field: &str, label: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.add(field, format!("{label} must be at most {max} characters"));
        }
    }

    pub fn one_of(&mut self, field: &str, label: &str, value: &str, choices: &[&str]) {
        if !value.is_empty() && !choices.iter().any(|c| c.eq_ignore_ascii_case(value)) {
            self.add(
                field,
                format!("{label} must be one of: {}", choices.join(", ")),
            );
        }
    }

    pub fn in_range(&mut self, field: &str, label: &str, value: u32, min: u32, max: u32) {
        if !(min..=max).contains(&value) {
            self.add(field, format!("{label} must be between {min} and {max}"));
        }
    }

    pub fn url(&mut self, field: &str, label: &str, value: &str) {
        if !value.trim().is_empty() && url::Url::parse(value.trim()).is_err() {
            self.add(field, format!("{label} must be a valid URL"));
        }
    }
}

impl From<FieldErrors> for ValidationErrors {
    fn from(fields: FieldErrors) -> Self {
        Self(fields)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_accumulate_per_field() {
        let mut errors = ValidationErrors::new();
        errors.require("title", "Title", "   ");
        errors.max_len("title", "Title", &"x".repeat(5), 3);
        errors.one_of("category", "Category", "Gossip", &["General", "Event"]);
        errors.in_range("pinnedOrder", "Pinned order", 0, 1, 9999);

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.first("title"), Some("Title is required"));
        assert_eq!(errors.first("Category"), Some("Category must be one of: General, Event"));
    }

    #[test]
    fn server_keys_merge_case_insensitively() {
        let mut fields = FieldErrors::new();
        fields.insert("Email".into(), vec!["taken".into()]);
        let errors = ValidationErrors::from(fields);
        assert_eq!(errors.first("email"), Some("taken"));
        assert_eq!(errors.to_string(), "Email: taken");
    }

    #[test]
    fn overwrite_replaces_fields_it_names() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "Title is required");
        errors.add("content", "Content is required");

        let mut incoming = ValidationErrors::new();
        incoming.add("Title", "Title is required");
        errors.overwrite(incoming);

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.to_string(), "Title: Title is required; content: Content is required");
    }
}
