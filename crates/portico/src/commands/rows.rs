//! Table rows and detail views for every resource.

use chrono::{DateTime, Utc};
use tabled::Tabled;

use portico_core::form::RecordForm;
use portico_core::{
    Announcement, Document, FieldKind, Gallery, NewsItem, Resource, Role, User, Violation,
};

/// A resource the CLI can print as a table row.
pub trait Listing: Resource {
    type Row: Tabled;

    fn row(&self) -> Self::Row;
}

fn when(dt: Option<&DateTime<Utc>>) -> String {
    dt.map_or_else(|| "-".into(), |d| d.format("%Y-%m-%d %H:%M").to_string())
}

fn pin(is_pinned: bool, order: u32) -> String {
    if is_pinned { format!("#{order}") } else { String::new() }
}

fn or_dash(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or("-").to_owned()
}

// ── Detail view ─────────────────────────────────────────────────────

/// Key/value listing driven by the record's form fields.
pub fn detail<R: Resource>(record: &R) -> String {
    let form = <R::Form as RecordForm>::seed(record);
    let mut lines: Vec<(&str, String)> = vec![("ID", record.id().to_string())];
    if let Some(status) = record.status() {
        lines.push(("Status", status.to_string()));
    }
    for spec in <R::Form as RecordForm>::fields() {
        if spec.kind == FieldKind::Secret {
            continue;
        }
        let value = form.get(spec.key).unwrap_or_default();
        lines.push((spec.label, if value.is_empty() { "-".into() } else { value }));
    }

    let width = lines.iter().map(|(label, _)| label.len()).max().unwrap_or(0) + 1;
    lines
        .into_iter()
        .map(|(label, value)| format!("{:<width$} {value}", format!("{label}:")))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Content ─────────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct AnnouncementRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Pinned")]
    pinned: String,
    #[tabled(rename = "Publish At")]
    publish_at: String,
}

impl Listing for Announcement {
    type Row = AnnouncementRow;

    fn row(&self) -> AnnouncementRow {
        AnnouncementRow {
            id: self.id.to_string(),
            title: self.title.clone(),
            category: self.category.clone(),
            status: self.status.to_string(),
            pinned: pin(self.is_pinned, self.pinned_order),
            publish_at: when(self.publish_at.as_ref()),
        }
    }
}

#[derive(Tabled)]
pub struct DocumentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Pinned")]
    pinned: String,
}

impl Listing for Document {
    type Row = DocumentRow;

    fn row(&self) -> DocumentRow {
        DocumentRow {
            id: self.id.to_string(),
            title: self.title.clone(),
            category: self.category.clone(),
            file: self
                .file_name
                .clone()
                .unwrap_or_else(|| self.file_url.clone()),
            status: self.status.to_string(),
            pinned: pin(self.is_pinned, self.pinned_order),
        }
    }
}

#[derive(Tabled)]
pub struct GalleryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Images")]
    images: usize,
    #[tabled(rename = "Event Date")]
    event_date: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Pinned")]
    pinned: String,
}

impl Listing for Gallery {
    type Row = GalleryRow;

    fn row(&self) -> GalleryRow {
        GalleryRow {
            id: self.id.to_string(),
            title: self.title.clone(),
            images: self.image_urls.len(),
            event_date: when(self.event_date.as_ref()),
            status: self.status.to_string(),
            pinned: pin(self.is_pinned, self.pinned_order),
        }
    }
}

#[derive(Tabled)]
pub struct NewsRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Pinned")]
    pinned: String,
    #[tabled(rename = "Publish At")]
    publish_at: String,
}

impl Listing for NewsItem {
    type Row = NewsRow;

    fn row(&self) -> NewsRow {
        NewsRow {
            id: self.id.to_string(),
            title: self.title.clone(),
            author: or_dash(self.author.as_deref()),
            status: self.status.to_string(),
            pinned: pin(self.is_pinned, self.pinned_order),
            publish_at: when(self.publish_at.as_ref()),
        }
    }
}

// ── Violations ──────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct ViolationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Reference")]
    reference: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Occurred")]
    occurred_at: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl Listing for Violation {
    type Row = ViolationRow;

    fn row(&self) -> ViolationRow {
        ViolationRow {
            id: self.id.to_string(),
            reference: self.reference_number.clone(),
            title: self.title.clone(),
            severity: self.severity.to_string(),
            location: self.location.clone(),
            occurred_at: when(self.occurred_at.as_ref()),
            status: self.status.to_string(),
        }
    }
}

// ── Access control ──────────────────────────────────────────────────

#[derive(Tabled)]
pub struct RoleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Permissions")]
    permissions: usize,
}

impl Listing for Role {
    type Row = RoleRow;

    fn row(&self) -> RoleRow {
        RoleRow {
            id: self.id.to_string(),
            name: self.name.clone(),
            description: or_dash(self.description.as_deref()),
            permissions: self.permissions.len(),
        }
    }
}

#[derive(Tabled)]
pub struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Last Login")]
    last_login: String,
}

impl Listing for User {
    type Row = UserRow;

    fn row(&self) -> UserRow {
        let role = self
            .role_name
            .clone()
            .or_else(|| self.role_id.as_ref().map(ToString::to_string));
        UserRow {
            id: self.id.to_string(),
            username: self.username.clone(),
            email: self.email.clone(),
            role: or_dash(role.as_deref()),
            active: if self.is_active { "yes" } else { "no" }.into(),
            last_login: when(self.last_login_at.as_ref()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use portico_core::EntityId;

    fn announcement() -> Announcement {
        serde_json::from_value(serde_json::json!({
            "id": 3,
            "title": "Water outage",
            "category": "Maintenance",
            "status": "Published",
            "isPinned": true,
            "pinnedOrder": 2
        }))
        .unwrap()
    }

    #[test]
    fn row_shows_pin_slot() {
        let row = announcement().row();
        assert_eq!(row.pinned, "#2");
        assert_eq!(row.status, "Published");
        assert_eq!(row.publish_at, "-");
    }

    #[test]
    fn detail_lists_status_and_form_fields() {
        let text = detail(&announcement());
        let first = text.lines().next().unwrap();
        assert!(first.starts_with("ID:"));
        assert!(first.ends_with('3'));
        assert!(text.contains("Status:"));
        assert!(text.contains("Water outage"));
    }

    #[test]
    fn user_row_falls_back_to_role_id() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "u-1",
            "username": "mara",
            "email": "mara@example.org",
            "roleId": 4
        }))
        .unwrap();
        assert_eq!(user.id, EntityId::from("u-1"));
        assert_eq!(user.row().role, "4");
        assert_eq!(user.row().active, "yes");
    }
}
