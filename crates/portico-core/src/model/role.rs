// ── Role ──

use serde::{Deserialize, Serialize};

use super::EntityId;
use crate::form::{
    FieldKind, FieldSpec, FormMode, RecordForm, format_list, non_blank, parse_list, unknown_field,
};
use crate::resource::{Resource, ResourceKind};
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Resource for Role {
    type Form = RoleForm;
    const KIND: ResourceKind = ResourceKind::Roles;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoleForm {
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePayload {
    pub name: String,
    pub description: Option<String>,
    pub permissions: Vec<String>,
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("name", "Name", FieldKind::Text).required(),
    FieldSpec::new("description", "Description", FieldKind::Text),
    FieldSpec::new("permissions", "Permissions", FieldKind::List),
];

impl RecordForm for RoleForm {
    type Record = Role;
    type Payload = RolePayload;

    fn seed(record: &Role) -> Self {
        Self {
            name: record.name.clone(),
            description: record.description.clone().unwrap_or_default(),
            permissions: record.permissions.clone(),
        }
    }

    fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    fn get(&self, key: &str) -> Option<String> {
        Some(match key {
            "name" => self.name.clone(),
            "description" => self.description.clone(),
            "permissions" => format_list(&self.permissions),
            _ => return None,
        })
    }

    fn set(&mut self, key: &str, raw: &str) -> Result<(), String> {
        match key {
            "name" => self.name = raw.to_owned(),
            "description" => self.description = raw.to_owned(),
            "permissions" => self.permissions = parse_list(raw),
            _ => return Err(unknown_field(key)),
        }
        Ok(())
    }

    fn validate(&self, _mode: &FormMode) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require("name", "Name", &self.name);
        errors.max_len("name", "Name", &self.name, 64);
        if self
            .permissions
            .iter()
            .any(|p| p.chars().any(char::is_whitespace))
        {
            errors.add("permissions", "Permission names cannot contain spaces");
        }
        errors
    }

    fn payload(&self) -> RolePayload {
        RolePayload {
            name: self.name.trim().to_owned(),
            description: non_blank(&self.description),
            permissions: self.permissions.clone(),
        }
    }
}
