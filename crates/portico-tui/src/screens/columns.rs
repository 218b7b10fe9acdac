//! Per-entity table columns.

use chrono::{DateTime, Utc};
use ratatui::layout::Constraint;

use portico_core::{
    Announcement, Document, Gallery, NewsItem, Resource, Role, User, Violation,
};

/// A resource the TUI can lay out as a table row.
pub trait Columns: Resource {
    const HEADERS: &'static [&'static str];
    const WIDTHS: &'static [Constraint];

    /// One cell per header, already formatted.
    fn cells(&self) -> Vec<String>;
}

fn when(dt: Option<&DateTime<Utc>>) -> String {
    dt.map_or_else(|| "—".into(), |d| d.format("%Y-%m-%d %H:%M").to_string())
}

fn pin(is_pinned: bool, order: u32) -> String {
    if is_pinned { format!("#{order}") } else { String::new() }
}

fn or_dash(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or("—").to_owned()
}

// ── Content ──────────────────────────────────────────────────────────

impl Columns for Announcement {
    const HEADERS: &'static [&'static str] =
        &["Title", "Category", "Status", "Pin", "Publish At"];
    const WIDTHS: &'static [Constraint] = &[
        Constraint::Min(24),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Length(17),
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.category.clone(),
            self.status.to_string(),
            pin(self.is_pinned, self.pinned_order),
            when(self.publish_at.as_ref()),
        ]
    }
}

impl Columns for Document {
    const HEADERS: &'static [&'static str] = &["Title", "Category", "File", "Status", "Pin"];
    const WIDTHS: &'static [Constraint] = &[
        Constraint::Min(24),
        Constraint::Length(10),
        Constraint::Min(16),
        Constraint::Length(10),
        Constraint::Length(6),
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.category.clone(),
            self.file_name
                .clone()
                .unwrap_or_else(|| self.file_url.clone()),
            self.status.to_string(),
            pin(self.is_pinned, self.pinned_order),
        ]
    }
}

impl Columns for Gallery {
    const HEADERS: &'static [&'static str] = &["Title", "Images", "Event Date", "Status", "Pin"];
    const WIDTHS: &'static [Constraint] = &[
        Constraint::Min(24),
        Constraint::Length(7),
        Constraint::Length(17),
        Constraint::Length(10),
        Constraint::Length(6),
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.image_urls.len().to_string(),
            when(self.event_date.as_ref()),
            self.status.to_string(),
            pin(self.is_pinned, self.pinned_order),
        ]
    }
}

impl Columns for NewsItem {
    const HEADERS: &'static [&'static str] = &["Title", "Author", "Status", "Pin", "Publish At"];
    const WIDTHS: &'static [Constraint] = &[
        Constraint::Min(24),
        Constraint::Length(16),
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Length(17),
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            or_dash(self.author.as_deref()),
            self.status.to_string(),
            pin(self.is_pinned, self.pinned_order),
            when(self.publish_at.as_ref()),
        ]
    }
}

// ── Violations ───────────────────────────────────────────────────────

impl Columns for Violation {
    const HEADERS: &'static [&'static str] =
        &["Reference", "Title", "Severity", "Location", "Occurred", "Status"];
    const WIDTHS: &'static [Constraint] = &[
        Constraint::Length(12),
        Constraint::Min(20),
        Constraint::Length(9),
        Constraint::Length(16),
        Constraint::Length(17),
        Constraint::Length(10),
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.reference_number.clone(),
            self.title.clone(),
            self.severity.to_string(),
            self.location.clone(),
            when(self.occurred_at.as_ref()),
            self.status.to_string(),
        ]
    }
}

// ── Access control ───────────────────────────────────────────────────

impl Columns for Role {
    const HEADERS: &'static [&'static str] = &["Name", "Description", "Permissions"];
    const WIDTHS: &'static [Constraint] = &[
        Constraint::Length(20),
        Constraint::Min(24),
        Constraint::Length(11),
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            or_dash(self.description.as_deref()),
            self.permissions.len().to_string(),
        ]
    }
}

impl Columns for User {
    const HEADERS: &'static [&'static str] = &["Username", "Email", "Role", "Active", "Last Login"];
    const WIDTHS: &'static [Constraint] = &[
        Constraint::Length(16),
        Constraint::Min(24),
        Constraint::Length(14),
        Constraint::Length(6),
        Constraint::Length(17),
    ];

    fn cells(&self) -> Vec<String> {
        let role = self
            .role_name
            .clone()
            .or_else(|| self.role_id.as_ref().map(ToString::to_string));
        vec![
            self.username.clone(),
            self.email.clone(),
            or_dash(role.as_deref()),
            if self.is_active { "yes" } else { "no" }.into(),
            when(self.last_login_at.as_ref()),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_shape<R: Columns>(record: &R) {
        assert_eq!(R::HEADERS.len(), R::WIDTHS.len());
        assert_eq!(record.cells().len(), R::HEADERS.len());
    }

    #[test]
    fn every_entity_has_one_cell_per_header() {
        let a: Announcement =
            serde_json::from_value(json!({ "id": 1, "title": "t", "isPinned": true, "pinnedOrder": 3 }))
                .unwrap();
        assert_shape(&a);
        assert_eq!(a.cells()[3], "#3");

        let d: Document = serde_json::from_value(json!({ "id": 2, "title": "Minutes" })).unwrap();
        assert_shape(&d);
        let g: Gallery = serde_json::from_value(json!({ "id": 3, "title": "Fair" })).unwrap();
        assert_shape(&g);
        let n: NewsItem = serde_json::from_value(json!({ "id": 4, "title": "Budget" })).unwrap();
        assert_shape(&n);
        let v: Violation = serde_json::from_value(json!({
            "id": 5, "referenceNumber": "V-5", "title": "Noise"
        }))
        .unwrap();
        assert_shape(&v);
        let r: Role = serde_json::from_value(json!({ "id": 6, "name": "Editor" })).unwrap();
        assert_shape(&r);
        let u: User = serde_json::from_value(json!({
            "id": 7, "username": "mara", "email": "mara@example.org"
        }))
        .unwrap();
        assert_shape(&u);
    }

    #[test]
    fn missing_dates_render_as_dash() {
        let n: NewsItem = serde_json::from_value(json!({ "id": 4, "title": "Budget" })).unwrap();
        assert_eq!(n.cells()[1], "—");
        assert_eq!(n.cells()[4], "—");
    }
}
