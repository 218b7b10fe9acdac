// ── User accounts ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EntityId;
use crate::form::{
    FieldKind, FieldSpec, FormMode, RecordForm, non_blank, parse_flag, unknown_field,
};
use crate::resource::{Resource, ResourceKind};
use crate::validation::ValidationErrors;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role_id: Option<EntityId>,
    /// Some deployments embed the role name for display.
    #[serde(default)]
    pub role_name: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl Resource for User {
    type Form = UserForm;
    const KIND: ResourceKind = ResourceKind::Users;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.username
    }
}

// ── Form ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct UserForm {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role_id: String,
    pub is_active: bool,
    /// Only sent when non-empty; edits keep the current password.
    pub password: String,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            username: String::new(),
            email: String::new(),
            full_name: String::new(),
            role_id: String::new(),
            is_active: true,
            password: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub role_id: EntityId,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("username", "Username", FieldKind::Text).required(),
    FieldSpec::new("email", "Email", FieldKind::Text).required(),
    FieldSpec::new("fullName", "Full name", FieldKind::Text),
    FieldSpec::new("roleId", "Role id", FieldKind::Reference).required(),
    FieldSpec::new("isActive", "Active", FieldKind::Flag),
    FieldSpec::new("password", "Password", FieldKind::Secret),
];

impl RecordForm for UserForm {
    type Record = User;
    type Payload = UserPayload;

    fn seed(record: &User) -> Self {
        Self {
            username: record.username.clone(),
            email: record.email.clone(),
            full_name: record.full_name.clone().unwrap_or_default(),
            role_id: record
                .role_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            is_active: record.is_active,
            password: String::new(),
        }
    }

    fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    fn get(&self, key: &str) -> Option<String> {
        Some(match key {
            "username" => self.username.clone(),
            "email" => self.email.clone(),
            "fullName" => self.full_name.clone(),
            "roleId" => self.role_id.clone(),
            "isActive" => self.is_active.to_string(),
            "password" => self.password.clone(),
            _ => return None,
        })
    }

    fn set(&mut self, key: &str, raw: &str) -> Result<(), String> {
        match key {
            "username" => self.username = raw.trim().to_owned(),
            "email" => self.email = raw.trim().to_owned(),
            "fullName" => self.full_name = raw.to_owned(),
            "roleId" => self.role_id = raw.trim().to_owned(),
            "isActive" => self.is_active = parse_flag(raw)?,
            "password" => self.password = raw.to_owned(),
            _ => return Err(unknown_field(key)),
        }
        Ok(())
    }

    fn validate(&self, mode: &FormMode) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require("username", "Username", &self.username);
        if !self.username.is_empty() && !(3..=64).contains(&self.username.chars().count()) {
            errors.add("username", "Username must be 3 to 64 characters");
        }
        errors.require("email", "Email", &self.email);
        if !self.email.is_empty() && !looks_like_email(&self.email) {
            errors.add("email", "Email must be a valid address");
        }
        errors.require("roleId", "Role", &self.role_id);

        let needs_password = matches!(mode, FormMode::Create);
        if needs_password && self.password.is_empty() {
            errors.add("password", "Password is required");
        } else if !self.password.is_empty() && self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.add(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }
        errors
    }

    fn payload(&self) -> UserPayload {
        UserPayload {
            username: self.username.clone(),
            email: self.email.clone(),
            full_name: non_blank(&self.full_name),
            role_id: EntityId::from(self.role_id.as_str()),
            is_active: self.is_active,
            password: (!self.password.is_empty()).then(|| self.password.clone()),
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record() -> User {
        serde_json::from_value(serde_json::json!({
            "id": "8a7f0c2e-5b1d-4c8e-9f3a-2d6b7e1c0a94",
            "username": "mhale",
            "email": "mhale@example.org",
            "roleId": 3
        }))
        .unwrap()
    }

    #[test]
    fn password_required_only_on_create() {
        let form = UserForm::seed(&record());
        assert!(form.is_active, "missing isActive defaults to active");
        assert_eq!(form.role_id, "3");

        let id = record().id;
        assert!(form.validate(&FormMode::Edit(id)).is_empty());
        assert_eq!(
            form.validate(&FormMode::Create).first("password"),
            Some("Password is required")
        );
    }

    #[test]
    fn empty_password_is_omitted_from_payload() {
        let form = UserForm::seed(&record());
        let body = form.payload_json().unwrap();
        assert!(body.get("password").is_none());
        assert_eq!(body["roleId"], 3);
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(looks_like_email("a@b.org"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("@b.org"));
    }
}
