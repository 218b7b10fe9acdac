// ── Announcement ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lifecycle::{MAX_PINNED_ORDER, effective_pinned_order};
use super::{EntityId, RecordStatus};
use crate::form::{
    FieldKind, FieldSpec, FormMode, RecordForm, canonical_choice, format_optional_datetime,
    parse_count, parse_datetime, parse_flag, serialize_optional_iso, unknown_field,
};
use crate::resource::{ANNOUNCEMENT_CATEGORIES, Resource, ResourceKind};
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub pinned_order: u32,
    #[serde(default)]
    pub publish_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resource for Announcement {
    type Form = AnnouncementForm;
    const KIND: ResourceKind = ResourceKind::Announcements;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn status(&self) -> Option<RecordStatus> {
        Some(self.status)
    }

    fn is_pinned(&self) -> Option<bool> {
        Some(self.is_pinned)
    }
}

// ── Form ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct AnnouncementForm {
    pub title: String,
    pub content: String,
    pub category: String,
    pub is_pinned: bool,
    pub pinned_order: u32,
    pub publish_at: Option<DateTime<Utc>>,
}

impl Default for AnnouncementForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            category: "General".into(),
            is_pinned: false,
            pinned_order: 0,
            publish_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementPayload {
    pub title: String,
    pub content: String,
    pub category: String,
    pub is_pinned: bool,
    pub pinned_order: u32,
    #[serde(serialize_with = "serialize_optional_iso")]
    pub publish_at: Option<DateTime<Utc>>,
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("title", "Title", FieldKind::Text).required(),
    FieldSpec::new("content", "Content", FieldKind::Multiline).required(),
    FieldSpec::new("category", "Category", FieldKind::Choice(ANNOUNCEMENT_CATEGORIES)).required(),
    FieldSpec::new("isPinned", "Pinned", FieldKind::Flag),
    FieldSpec::new("pinnedOrder", "Pin order", FieldKind::Number),
    FieldSpec::new("publishAt", "Publish at", FieldKind::DateTime),
];

impl RecordForm for AnnouncementForm {
    type Record = Announcement;
    type Payload = AnnouncementPayload;

    fn seed(record: &Announcement) -> Self {
        Self {
            title: record.title.clone(),
            content: record.content.clone(),
            category: record.category.clone(),
            is_pinned: record.is_pinned,
            pinned_order: record.pinned_order,
            publish_at: record.publish_at,
        }
    }

    fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    fn get(&self, key: &str) -> Option<String> {
        Some(match key {
            "title" => self.title.clone(),
            "content" => self.content.clone(),
            "category" => self.category.clone(),
            "isPinned" => self.is_pinned.to_string(),
            "pinnedOrder" => self.pinned_order.to_string(),
            "publishAt" => format_optional_datetime(self.publish_at.as_ref()),
            _ => return None,
        })
    }

    fn set(&mut self, key: &str, raw: &str) -> Result<(), String> {
        match key {
            "title" => self.title = raw.to_owned(),
            "content" => self.content = raw.to_owned(),
            "category" => self.category = canonical_choice(raw, ANNOUNCEMENT_CATEGORIES),
            "isPinned" => self.is_pinned = parse_flag(raw)?,
            "pinnedOrder" => self.pinned_order = parse_count(raw)?,
            "publishAt" => self.publish_at = parse_datetime(raw)?,
            _ => return Err(unknown_field(key)),
        }
        Ok(())
    }

    fn validate(&self, _mode: &FormMode) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require("title", "Title", &self.title);
        errors.max_len("title", "Title", &self.title, 200);
        errors.require("content", "Content", &self.content);
        errors.require("category", "Category", &self.category);
        errors.one_of("category", "Category", &self.category, ANNOUNCEMENT_CATEGORIES);
        if self.is_pinned {
            errors.in_range("pinnedOrder", "Pin order", self.pinned_order, 1, MAX_PINNED_ORDER);
        }
        errors
    }

    fn payload(&self) -> AnnouncementPayload {
        AnnouncementPayload {
            title: self.title.trim().to_owned(),
            content: self.content.clone(),
            category: self.category.clone(),
            is_pinned: self.is_pinned,
            pinned_order: effective_pinned_order(self.is_pinned, self.pinned_order),
            publish_at: self.publish_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record() -> Announcement {
        serde_json::from_value(serde_json::json!({
            "id": 11,
            "title": "Water main repair",
            "content": "Expect low pressure on Elm St.",
            "category": "Maintenance",
            "status": "Published",
            "isPinned": true,
            "pinnedOrder": 2,
            "publishAt": "2026-04-02T08:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn decodes_camel_case_record() {
        let a = record();
        assert_eq!(a.id, EntityId::Numeric(11));
        assert_eq!(a.status, RecordStatus::Published);
        assert!(a.is_pinned);
        assert_eq!(a.display_name(), "Water main repair");
    }

    #[test]
    fn unpinned_payload_zeroes_order() {
        let mut form = AnnouncementForm::seed(&record());
        form.set("isPinned", "no").unwrap();
        let body = form.payload_json().unwrap();
        assert_eq!(body["isPinned"], false);
        assert_eq!(body["pinnedOrder"], 0);
        assert_eq!(body["publishAt"], "2026-04-02T08:00:00.000Z");
    }

    #[test]
    fn pinned_needs_positive_order() {
        let mut form = AnnouncementForm {
            title: "Hello".into(),
            content: "World".into(),
            ..AnnouncementForm::default()
        };
        form.is_pinned = true;
        let errors = form.validate(&FormMode::Create);
        assert_eq!(errors.first("pinnedOrder"), Some("Pin order must be between 1 and 9999"));

        form.set("pinnedOrder", "4").unwrap();
        assert!(form.validate(&FormMode::Create).is_empty());
    }

    #[test]
    fn category_membership_is_checked() {
        let mut form = AnnouncementForm::seed(&record());
        form.set("category", "gossip").unwrap();
        assert!(form.validate(&FormMode::Create).first("category").is_some());
        form.set("category", "event").unwrap();
        assert_eq!(form.category, "Event");
    }
}
