// ── News ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lifecycle::{MAX_PINNED_ORDER, effective_pinned_order};
use super::{EntityId, RecordStatus};
use crate::form::{
    FieldKind, FieldSpec, FormMode, RecordForm, format_list, format_optional_datetime, non_blank,
    parse_count, parse_datetime, parse_flag, parse_list, serialize_optional_iso, unknown_field,
};
use crate::resource::{Resource, ResourceKind};
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
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
}

impl Resource for NewsItem {
    type Form = NewsForm;
    const KIND: ResourceKind = ResourceKind::News;

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

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewsForm {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub author: String,
    pub tags: Vec<String>,
    pub is_pinned: bool,
    pub pinned_order: u32,
    pub publish_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsPayload {
    pub title: String,
    pub summary: Option<String>,
    pub content: String,
    pub author: Option<String>,
    pub tags: Vec<String>,
    pub is_pinned: bool,
    pub pinned_order: u32,
    #[serde(serialize_with = "serialize_optional_iso")]
    pub publish_at: Option<DateTime<Utc>>,
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("title", "Title", FieldKind::Text).required(),
    FieldSpec::new("summary", "Summary", FieldKind::Text),
    FieldSpec::new("content", "Content", FieldKind::Multiline).required(),
    FieldSpec::new("author", "Author", FieldKind::Text),
    FieldSpec::new("tags", "Tags", FieldKind::List),
    FieldSpec::new("isPinned", "Pinned", FieldKind::Flag),
    FieldSpec::new("pinnedOrder", "Pin order", FieldKind::Number),
    FieldSpec::new("publishAt", "Publish at", FieldKind::DateTime),
];

impl RecordForm for NewsForm {
    type Record = NewsItem;
    type Payload = NewsPayload;

    fn seed(record: &NewsItem) -> Self {
        Self {
            title: record.title.clone(),
            summary: record.summary.clone().unwrap_or_default(),
            content: record.content.clone(),
            author: record.author.clone().unwrap_or_default(),
            tags: record.tags.clone(),
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
            "summary" => self.summary.clone(),
            "content" => self.content.clone(),
            "author" => self.author.clone(),
            "tags" => format_list(&self.tags),
            "isPinned" => self.is_pinned.to_string(),
            "pinnedOrder" => self.pinned_order.to_string(),
            "publishAt" => format_optional_datetime(self.publish_at.as_ref()),
            _ => return None,
        })
    }

    fn set(&mut self, key: &str, raw: &str) -> Result<(), String> {
        match key {
            "title" => self.title = raw.to_owned(),
            "summary" => self.summary = raw.to_owned(),
            "content" => self.content = raw.to_owned(),
            "author" => self.author = raw.to_owned(),
            "tags" => self.tags = parse_list(raw),
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
        errors.max_len("summary", "Summary", &self.summary, 500);
        errors.require("content", "Content", &self.content);
        if self.is_pinned {
            errors.in_range("pinnedOrder", "Pin order", self.pinned_order, 1, MAX_PINNED_ORDER);
        }
        errors
    }

    fn payload(&self) -> NewsPayload {
        NewsPayload {
            title: self.title.trim().to_owned(),
            summary: non_blank(&self.summary),
            content: self.content.clone(),
            author: non_blank(&self.author),
            tags: self.tags.clone(),
            is_pinned: self.is_pinned,
            pinned_order: effective_pinned_order(self.is_pinned, self.pinned_order),
            publish_at: self.publish_at,
        }
    }
}
