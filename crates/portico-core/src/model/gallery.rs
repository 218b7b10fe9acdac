// ── Gallery ──

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
pub struct Gallery {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub event_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub pinned_order: u32,
}

impl Resource for Gallery {
    type Form = GalleryForm;
    const KIND: ResourceKind = ResourceKind::Galleries;

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
pub struct GalleryForm {
    pub title: String,
    pub description: String,
    pub cover_image_url: String,
    pub image_urls: Vec<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub is_pinned: bool,
    pub pinned_order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryPayload {
    pub title: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub image_urls: Vec<String>,
    #[serde(serialize_with = "serialize_optional_iso")]
    pub event_date: Option<DateTime<Utc>>,
    pub is_pinned: bool,
    pub pinned_order: u32,
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("title", "Title", FieldKind::Text).required(),
    FieldSpec::new("description", "Description", FieldKind::Multiline),
    FieldSpec::new("coverImageUrl", "Cover image URL", FieldKind::Text),
    FieldSpec::new("imageUrls", "Image URLs", FieldKind::List),
    FieldSpec::new("eventDate", "Event date", FieldKind::DateTime).required(),
    FieldSpec::new("isPinned", "Pinned", FieldKind::Flag),
    FieldSpec::new("pinnedOrder", "Pin order", FieldKind::Number),
];

impl RecordForm for GalleryForm {
    type Record = Gallery;
    type Payload = GalleryPayload;

    fn seed(record: &Gallery) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone().unwrap_or_default(),
            cover_image_url: record.cover_image_url.clone().unwrap_or_default(),
            image_urls: record.image_urls.clone(),
            event_date: record.event_date,
            is_pinned: record.is_pinned,
            pinned_order: record.pinned_order,
        }
    }

    fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    fn get(&self, key: &str) -> Option<String> {
        Some(match key {
            "title" => self.title.clone(),
            "description" => self.description.clone(),
            "coverImageUrl" => self.cover_image_url.clone(),
            "imageUrls" => format_list(&self.image_urls),
            "eventDate" => format_optional_datetime(self.event_date.as_ref()),
            "isPinned" => self.is_pinned.to_string(),
            "pinnedOrder" => self.pinned_order.to_string(),
            _ => return None,
        })
    }

    fn set(&mut self, key: &str, raw: &str) -> Result<(), String> {
        match key {
            "title" => self.title = raw.to_owned(),
            "description" => self.description = raw.to_owned(),
            "coverImageUrl" => self.cover_image_url = raw.trim().to_owned(),
            "imageUrls" => self.image_urls = parse_list(raw),
            "eventDate" => self.event_date = parse_datetime(raw)?,
            "isPinned" => self.is_pinned = parse_flag(raw)?,
            "pinnedOrder" => self.pinned_order = parse_count(raw)?,
            _ => return Err(unknown_field(key)),
        }
        Ok(())
    }

    fn validate(&self, _mode: &FormMode) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require("title", "Title", &self.title);
        errors.max_len("title", "Title", &self.title, 200);
        errors.url("coverImageUrl", "Cover image URL", &self.cover_image_url);
        for url in &self.image_urls {
            errors.url("imageUrls", "Image URL", url);
        }
        if self.event_date.is_none() {
            errors.add("eventDate", "Event date is required");
        }
        if self.is_pinned {
            errors.in_range("pinnedOrder", "Pin order", self.pinned_order, 1, MAX_PINNED_ORDER);
        }
        errors
    }

    fn payload(&self) -> GalleryPayload {
        GalleryPayload {
            title: self.title.trim().to_owned(),
            description: non_blank(&self.description),
            cover_image_url: non_blank(&self.cover_image_url),
            image_urls: self.image_urls.clone(),
            event_date: self.event_date,
            is_pinned: self.is_pinned,
            pinned_order: effective_pinned_order(self.is_pinned, self.pinned_order),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn event_date_must_be_present() {
        let mut form = GalleryForm {
            title: "Harvest fair".into(),
            ..GalleryForm::default()
        };
        assert_eq!(
            form.validate(&FormMode::Create).first("eventDate"),
            Some("Event date is required")
        );
        form.set("eventDate", "2026-09-12").unwrap();
        form.set("imageUrls", "https://img.example.org/1.jpg, https://img.example.org/2.jpg")
            .unwrap();
        assert!(form.validate(&FormMode::Create).is_empty());
        assert_eq!(form.payload().image_urls.len(), 2);
    }
}
