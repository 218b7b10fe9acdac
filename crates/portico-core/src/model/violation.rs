// ── Violation reports ──
//
// Code-enforcement and conduct reports filed against a location. These
// are records, not content: they are never published or pinned, only
// archived once resolved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::{EntityId, RecordStatus};
use crate::form::{
    FieldKind, FieldSpec, FormMode, RecordForm, format_optional_datetime, non_blank,
    parse_datetime, serialize_optional_iso, unknown_field,
};
use crate::resource::{Resource, ResourceKind, SEVERITIES};
use crate::validation::ValidationErrors;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Severity {
    #[default]
    #[serde(alias = "low", alias = "LOW")]
    Low,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "high", alias = "HIGH")]
    High,
    #[serde(alias = "critical", alias = "CRITICAL")]
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub id: EntityId,
    pub reference_number: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reporter_name: Option<String>,
}

impl Resource for Violation {
    type Form = ViolationForm;
    const KIND: ResourceKind = ResourceKind::Violations;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.reference_number
    }

    fn status(&self) -> Option<RecordStatus> {
        Some(self.status)
    }
}

// ── Form ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViolationForm {
    pub reference_number: String,
    pub title: String,
    pub description: String,
    pub location: String,
    /// Kept as text so an unknown value is reported, not silently coerced.
    pub severity: String,
    pub occurred_at: Option<DateTime<Utc>>,
    pub reporter_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationPayload {
    pub reference_number: String,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub severity: Severity,
    #[serde(serialize_with = "serialize_optional_iso")]
    pub occurred_at: Option<DateTime<Utc>>,
    pub reporter_name: Option<String>,
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("referenceNumber", "Reference #", FieldKind::Text).required(),
    FieldSpec::new("title", "Title", FieldKind::Text).required(),
    FieldSpec::new("description", "Description", FieldKind::Multiline),
    FieldSpec::new("location", "Location", FieldKind::Text).required(),
    FieldSpec::new("severity", "Severity", FieldKind::Choice(SEVERITIES)).required(),
    FieldSpec::new("occurredAt", "Occurred at", FieldKind::DateTime).required(),
    FieldSpec::new("reporterName", "Reporter", FieldKind::Text),
];

impl RecordForm for ViolationForm {
    type Record = Violation;
    type Payload = ViolationPayload;

    fn seed(record: &Violation) -> Self {
        Self {
            reference_number: record.reference_number.clone(),
            title: record.title.clone(),
            description: record.description.clone().unwrap_or_default(),
            location: record.location.clone(),
            severity: record.severity.to_string(),
            occurred_at: record.occurred_at,
            reporter_name: record.reporter_name.clone().unwrap_or_default(),
        }
    }

    fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    fn get(&self, key: &str) -> Option<String> {
        Some(match key {
            "referenceNumber" => self.reference_number.clone(),
            "title" => self.title.clone(),
            "description" => self.description.clone(),
            "location" => self.location.clone(),
            "severity" => self.severity.clone(),
            "occurredAt" => format_optional_datetime(self.occurred_at.as_ref()),
            "reporterName" => self.reporter_name.clone(),
            _ => return None,
        })
    }

    fn set(&mut self, key: &str, raw: &str) -> Result<(), String> {
        match key {
            "referenceNumber" => self.reference_number = raw.trim().to_owned(),
            "title" => self.title = raw.to_owned(),
            "description" => self.description = raw.to_owned(),
            "location" => self.location = raw.to_owned(),
            "severity" => self.severity = raw.trim().to_owned(),
            "occurredAt" => self.occurred_at = parse_datetime(raw)?,
            "reporterName" => self.reporter_name = raw.to_owned(),
            _ => return Err(unknown_field(key)),
        }
        Ok(())
    }

    fn validate(&self, _mode: &FormMode) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require("referenceNumber", "Reference number", &self.reference_number);
        errors.max_len("referenceNumber", "Reference number", &self.reference_number, 32);
        errors.require("title", "Title", &self.title);
        errors.require("location", "Location", &self.location);
        errors.require("severity", "Severity", &self.severity);
        if !self.severity.is_empty() && self.severity.parse::<Severity>().is_err() {
            errors.add(
                "severity",
                format!("Severity must be one of: {}", SEVERITIES.join(", ")),
            );
        }
        match self.occurred_at {
            None => errors.add("occurredAt", "Occurred at is required"),
            Some(at) if at > Utc::now() => {
                errors.add("occurredAt", "Occurred at cannot be in the future");
            }
            Some(_) => {}
        }
        errors
    }

    fn payload(&self) -> ViolationPayload {
        ViolationPayload {
            reference_number: self.reference_number.clone(),
            title: self.title.trim().to_owned(),
            description: non_blank(&self.description),
            location: self.location.trim().to_owned(),
            severity: self.severity.parse().unwrap_or_default(),
            occurred_at: self.occurred_at,
            reporter_name: non_blank(&self.reporter_name),
        }
    }
}
