// ── Record forms ──
//
// Each entity has exactly one form type and one seeding function. Forms
// hold typed values; the text accessors exist so the TUI editor and the
// CLI's `--set key=value` can drive any form without knowing its type.

use std::fmt::Debug;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::error::CoreError;
use crate::model::EntityId;
use crate::resource::Resource;
use crate::validation::ValidationErrors;

/// Whether a form is creating a record or editing an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Create,
    Edit(EntityId),
}

/// Input widget hint for a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Multiline,
    Choice(&'static [&'static str]),
    Flag,
    DateTime,
    Number,
    List,
    Reference,
    Secret,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: false,
        }
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }
}

/// The typed create/edit form for one record type.
pub trait RecordForm: Default + Clone + Debug + PartialEq + Send + Sync + 'static {
    type Record: Resource<Form = Self>;
    /// The JSON body sent on create and update.
    type Payload: Serialize;

    /// Seed a form from an existing record.
    fn seed(record: &Self::Record) -> Self;

    /// Field table, in display order.
    fn fields() -> &'static [FieldSpec];

    /// Current value of `key` as editable text.
    fn get(&self, key: &str) -> Option<String>;

    /// Parse `raw` into field `key`. Returns a message on bad input.
    fn set(&mut self, key: &str, raw: &str) -> Result<(), String>;

    /// Client-side rules: required fields, enum membership, numeric
    /// bounds, date presence.
    fn validate(&self, mode: &FormMode) -> ValidationErrors;

    /// Build the wire body, applying coercions such as zeroing the pinned
    /// order of unpinned records.
    fn payload(&self) -> Self::Payload;

    fn payload_json(&self) -> Result<serde_json::Value, CoreError> {
        serde_json::to_value(self.payload())
            .map_err(|e| CoreError::Internal(format!("payload serialization failed: {e}")))
    }

    fn field(key: &str) -> Option<&'static FieldSpec> {
        Self::fields().iter().find(|f| f.key.eq_ignore_ascii_case(key))
    }

    /// Like [`set`](Self::set), but resolves `key` case-insensitively
    /// against the field table first.
    fn assign(&mut self, key: &str, raw: &str) -> Result<(), String> {
        let spec = Self::field(key).ok_or_else(|| unknown_field(key))?;
        self.set(spec.key, raw)
    }
}

// ── Text codecs shared by every form ─────────────────────────────────

pub(crate) fn unknown_field(key: &str) -> String {
    format!("unknown field `{key}`")
}

pub fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "on" => Ok(true),
        "false" | "no" | "n" | "0" | "off" | "" => Ok(false),
        other => Err(format!("expected yes/no, got `{other}`")),
    }
}

pub fn parse_count(raw: &str) -> Result<u32, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<u32>()
        .map_err(|_| format!("expected a whole number, got `{trimmed}`"))
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS]` (UTC), or a bare date
/// (midnight UTC). Blank input clears the value.
pub fn parse_datetime(raw: &str) -> Result<Option<DateTime<Utc>>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(Some(naive.and_utc()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Some(naive.and_utc()));
        }
    }
    Err(format!("expected a date like 2026-03-01 or 2026-03-01T09:30:00Z, got `{trimmed}`"))
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde hook: optional dates cross the wire in the same ISO shape as
/// filter parameters.
#[allow(clippy::ref_option)]
pub fn serialize_optional_iso<S: Serializer>(
    dt: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match dt {
        Some(dt) => serializer.serialize_str(&format_datetime(dt)),
        None => serializer.serialize_none(),
    }
}

pub fn format_optional_datetime(dt: Option<&DateTime<Utc>>) -> String {
    dt.map(format_datetime).unwrap_or_default()
}

/// Comma-separated list, trimmed, blanks dropped.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

pub fn format_list(items: &[String]) -> String {
    items.join(", ")
}

/// Resolve `raw` to the canonical spelling in `choices`, or keep it as-is so
/// validation can report it.
pub fn canonical_choice(raw: &str, choices: &[&str]) -> String {
    let trimmed = raw.trim();
    choices
        .iter()
        .find(|c| c.eq_ignore_ascii_case(trimmed))
        .map_or_else(|| trimmed.to_owned(), |c| (*c).to_owned())
}

/// Trimmed copy, `None` when blank.
pub fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn datetime_formats() {
        let dt = parse_datetime("2026-03-01").unwrap().unwrap();
        assert_eq!(format_datetime(&dt), "2026-03-01T00:00:00.000Z");
        let dt = parse_datetime("2026-03-01 09:30").unwrap().unwrap();
        assert_eq!(format_datetime(&dt), "2026-03-01T09:30:00.000Z");
        let dt = parse_datetime("2026-03-01T09:30:00+02:00").unwrap().unwrap();
        assert_eq!(format_datetime(&dt), "2026-03-01T07:30:00.000Z");
        assert_eq!(parse_datetime("  ").unwrap(), None);
        assert!(parse_datetime("next tuesday").is_err());
    }

    #[test]
    fn flags_counts_and_lists() {
        assert!(parse_flag("Yes").unwrap());
        assert!(!parse_flag("").unwrap());
        assert!(parse_flag("maybe").is_err());
        assert_eq!(parse_count(" 12 ").unwrap(), 12);
        assert!(parse_count("-1").is_err());
        assert_eq!(parse_list(" civic, ,parks "), vec!["civic", "parks"]);
    }

    #[test]
    fn choices_are_canonicalized() {
        assert_eq!(canonical_choice("event", &["General", "Event"]), "Event");
        assert_eq!(canonical_choice("Gossip", &["General"]), "Gossip");
    }
}
