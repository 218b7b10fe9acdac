// ── Document ──
//
// Downloadable files (policies, minutes, forms). The file itself is
// uploaded elsewhere; records carry its URL and display name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lifecycle::{MAX_PINNED_ORDER, effective_pinned_order};
use super::{EntityId, RecordStatus};
use crate::form::{
    FieldKind, FieldSpec, FormMode, RecordForm, canonical_choice, non_blank, parse_count,
    parse_flag, unknown_field,
};
use crate::resource::{DOCUMENT_CATEGORIES, Resource, ResourceKind};
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub pinned_order: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Resource for Document {
    type Form = DocumentForm;
    const KIND: ResourceKind = ResourceKind::Documents;

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
pub struct DocumentForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub file_url: String,
    pub file_name: String,
    pub is_pinned: bool,
    pub pinned_order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPayload {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub file_url: String,
    pub file_name: Option<String>,
    pub is_pinned: bool,
    pub pinned_order: u32,
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("title", "Title", FieldKind::Text).required(),
    FieldSpec::new("description", "Description", FieldKind::Multiline),
    FieldSpec::new("category", "Category", FieldKind::Choice(DOCUMENT_CATEGORIES)).required(),
    FieldSpec::new("fileUrl", "File URL", FieldKind::Text).required(),
    FieldSpec::new("fileName", "File name", FieldKind::Text),
    FieldSpec::new("isPinned", "Pinned", FieldKind::Flag),
    FieldSpec::new("pinnedOrder", "Pin order", FieldKind::Number),
];

impl RecordForm for DocumentForm {
    type Record = Document;
    type Payload = DocumentPayload;

    fn seed(record: &Document) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone().unwrap_or_default(),
            category: record.category.clone(),
            file_url: record.file_url.clone(),
            file_name: record.file_name.clone().unwrap_or_default(),
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
            "category" => self.category.clone(),
            "fileUrl" => self.file_url.clone(),
            "fileName" => self.file_name.clone(),
            "isPinned" => self.is_pinned.to_string(),
            "pinnedOrder" => self.pinned_order.to_string(),
            _ => return None,
        })
    }

    fn set(&mut self, key: &str, raw: &str) -> Result<(), String> {
        match key {
            "title" => self.title = raw.to_owned(),
            "description" => self.description = raw.to_owned(),
            "category" => self.category = canonical_choice(raw, DOCUMENT_CATEGORIES),
            "fileUrl" => self.file_url = raw.trim().to_owned(),
            "fileName" => self.file_name = raw.to_owned(),
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
        errors.require("category", "Category", &self.category);
        errors.one_of("category", "Category", &self.category, DOCUMENT_CATEGORIES);
        errors.require("fileUrl", "File URL", &self.file_url);
        errors.url("fileUrl", "File URL", &self.file_url);
        if self.is_pinned {
            errors.in_range("pinnedOrder", "Pin order", self.pinned_order, 1, MAX_PINNED_ORDER);
        }
        errors
    }

    fn payload(&self) -> DocumentPayload {
        DocumentPayload {
            title: self.title.trim().to_owned(),
            description: non_blank(&self.description),
            category: self.category.clone(),
            file_url: self.file_url.clone(),
            file_name: non_blank(&self.file_name),
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
    fn bad_url_is_rejected() {
        let mut form = DocumentForm {
            title: "Budget 2026".into(),
            category: "Report".into(),
            ..DocumentForm::default()
        };
        form.set("fileUrl", "not a url").unwrap();
        assert_eq!(
            form.validate(&FormMode::Create).first("fileUrl"),
            Some("File URL must be a valid URL")
        );
        form.set("fileUrl", "https://files.example.org/budget.pdf").unwrap();
        assert!(form.validate(&FormMode::Create).is_empty());
    }

    #[test]
    fn blank_optionals_are_sent_as_null() {
        let form = DocumentForm {
            title: " Minutes ".into(),
            description: "   ".into(),
            ..DocumentForm::default()
        };
        let body = form.payload_json().unwrap();
        assert_eq!(body["title"], "Minutes");
        assert!(body["description"].is_null());
        assert!(body["fileName"].is_null());
    }
}
