// ── Filter state ──
//
// Mapping from UI filter name to a typed value. Cleaning trims strings and
// drops empty values so only meaningful criteria reach the store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::form::{format_datetime, parse_datetime, parse_flag, parse_list};
use crate::model::EntityId;
use crate::resource::{FilterField, FilterKind};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterValue {
    Text(String),
    Choice(String),
    Flag(bool),
    Date(DateTime<Utc>),
    DateRange {
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    },
    Number(i64),
    List(Vec<String>),
    Reference(EntityId),
}

impl FilterValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Trimmed, non-empty form of this value, or `None` if it carries no
    /// criterion.
    pub fn clean(self) -> Option<Self> {
        match self {
            Self::Text(s) => trimmed(s).map(Self::Text),
            Self::Choice(s) => trimmed(s).map(Self::Choice),
            Self::List(items) => {
                let items: Vec<String> = items.into_iter().filter_map(trimmed).collect();
                (!items.is_empty()).then_some(Self::List(items))
            }
            Self::DateRange { from: None, to: None } => None,
            Self::Reference(EntityId::Key(s)) => {
                trimmed(s).map(|s| Self::Reference(EntityId::Key(s)))
            }
            other => Some(other),
        }
    }

    /// Editable text form, the inverse of [`parse_filter`].
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) | Self::Choice(s) => s.clone(),
            Self::Flag(b) => (if *b { "yes" } else { "no" }).to_owned(),
            Self::Date(d) => format_datetime(d),
            Self::DateRange { from, to } => format!(
                "{}..{}",
                from.as_ref().map(format_datetime).unwrap_or_default(),
                to.as_ref().map(format_datetime).unwrap_or_default()
            ),
            Self::Number(n) => n.to_string(),
            Self::List(items) => items.join(", "),
            Self::Reference(id) => id.to_string(),
        }
    }
}

fn trimmed(s: String) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else if t.len() == s.len() {
        Some(s)
    } else {
        Some(t.to_owned())
    }
}

/// Parse user text for `field`. Blank input yields `Ok(None)` (clear).
pub fn parse_filter(field: &FilterField, raw: &str) -> Result<Option<FilterValue>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value = match field.kind {
        FilterKind::Text => FilterValue::Text(raw.to_owned()),
        FilterKind::Choice(choices) => {
            let canonical = choices
                .iter()
                .find(|c| c.eq_ignore_ascii_case(raw))
                .ok_or_else(|| format!("{} must be one of: {}", field.label, choices.join(", ")))?;
            FilterValue::Choice((*canonical).to_owned())
        }
        FilterKind::Flag => FilterValue::Flag(parse_flag(raw)?),
        FilterKind::Date => match parse_datetime(raw)? {
            Some(d) => FilterValue::Date(d),
            None => return Ok(None),
        },
        FilterKind::DateRange { .. } => {
            let (from, to) = raw.split_once("..").unwrap_or((raw, ""));
            FilterValue::DateRange {
                from: parse_datetime(from)?,
                to: parse_datetime(to)?,
            }
        }
        FilterKind::Number => FilterValue::Number(
            raw.parse()
                .map_err(|_| format!("{} must be a number", field.label))?,
        ),
        FilterKind::List => FilterValue::List(parse_list(raw)),
        FilterKind::Reference => FilterValue::Reference(EntityId::from(raw)),
    };
    Ok(value.clean())
}

/// Committed or draft filter criteria, keyed by UI filter name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterState(BTreeMap<String, FilterValue>);

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: FilterValue) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: FilterValue) {
        self.0.insert(key.to_owned(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<FilterValue> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy with every entry cleaned; empty entries dropped.
    pub fn cleaned(self) -> Self {
        Self(
            self.0
                .into_iter()
                .filter_map(|(k, v)| v.clean().map(|v| (k, v)))
                .collect(),
        )
    }

    /// Merge `partial` into `self`. Entries that clean to nothing remove
    /// the key instead.
    pub(crate) fn patch(&mut self, partial: FilterState) {
        for (key, value) in partial.0 {
            match value.clean() {
                Some(value) => {
                    self.0.insert(key, value);
                }
                None => {
                    self.0.remove(&key);
                }
            }
        }
    }
}

impl FromIterator<(String, FilterValue)> for FilterState {
    fn from_iter<I: IntoIterator<Item = (String, FilterValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
