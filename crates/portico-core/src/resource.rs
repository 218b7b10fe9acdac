// ── Resource descriptors ──
//
// One generic engine serves every entity. Each entity contributes a typed
// record, a typed form, a filter field table, and an endpoint descriptor.

use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::CoreError;
use crate::form::RecordForm;
use crate::model::{EntityId, RecordStatus, TransitionKind};

// ── Resource trait ───────────────────────────────────────────────────

/// A typed record served by one list endpoint.
pub trait Resource:
    DeserializeOwned + Serialize + Clone + Debug + PartialEq + Send + Sync + 'static
{
    /// The single form type that creates and edits this record.
    type Form: RecordForm<Record = Self>;

    const KIND: ResourceKind;

    fn id(&self) -> &EntityId;

    /// Short human label (title, name, username).
    fn display_name(&self) -> &str;

    /// Publication status, for entities with a lifecycle.
    fn status(&self) -> Option<RecordStatus> {
        None
    }

    /// Pinned flag, for entities that can be pinned.
    fn is_pinned(&self) -> Option<bool> {
        None
    }
}

/// Decode one record from its wire JSON.
pub fn decode_record<R: Resource>(value: serde_json::Value) -> Result<R, CoreError> {
    serde_json::from_value(value).map_err(|e| CoreError::Decode {
        entity: R::KIND.singular().to_owned(),
        message: e.to_string(),
    })
}

// ── Filter field table ───────────────────────────────────────────────

/// How a filter value is typed and parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Text,
    Choice(&'static [&'static str]),
    Flag,
    Date,
    /// Sent as two query keys.
    DateRange {
        from: &'static str,
        to: &'static str,
    },
    Number,
    List,
    Reference,
}

/// One filterable field: UI name, query parameter, value kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    pub key: &'static str,
    pub label: &'static str,
    pub param: &'static str,
    pub kind: FilterKind,
}

impl FilterField {
    const fn new(key: &'static str, label: &'static str, param: &'static str, kind: FilterKind) -> Self {
        Self {
            key,
            label,
            param,
            kind,
        }
    }
}

/// UI name of the free-text search filter every entity supports.
pub const SEARCH: &str = "Search";

const STATUS_CHOICES: &[&str] = &["Draft", "Published", "Archived"];
pub const ANNOUNCEMENT_CATEGORIES: &[&str] = &["General", "Event", "Emergency", "Maintenance"];
pub const DOCUMENT_CATEGORIES: &[&str] = &["Policy", "Report", "Form", "Minutes", "Other"];
pub const SEVERITIES: &[&str] = &["Low", "Medium", "High", "Critical"];

const SEARCH_FIELD: FilterField =
    FilterField::new(SEARCH, "Search", "SearchTerm", FilterKind::Text);
const STATUS_FIELD: FilterField =
    FilterField::new("Status", "Status", "Status", FilterKind::Choice(STATUS_CHOICES));
const PINNED_FIELD: FilterField =
    FilterField::new("Pinned", "Pinned only", "IsPinned", FilterKind::Flag);
const PUBLISH_RANGE: FilterField = FilterField::new(
    "PublishDate",
    "Publish date",
    "PublishAt",
    FilterKind::DateRange {
        from: "PublishFrom",
        to: "PublishTo",
    },
);

const ANNOUNCEMENT_FILTERS: &[FilterField] = &[
    SEARCH_FIELD,
    STATUS_FIELD,
    FilterField::new(
        "Category",
        "Category",
        "Category",
        FilterKind::Choice(ANNOUNCEMENT_CATEGORIES),
    ),
    PINNED_FIELD,
    PUBLISH_RANGE,
];

const DOCUMENT_FILTERS: &[FilterField] = &[
    SEARCH_FIELD,
    STATUS_FIELD,
    FilterField::new(
        "Category",
        "Category",
        "Category",
        FilterKind::Choice(DOCUMENT_CATEGORIES),
    ),
    PINNED_FIELD,
];

const GALLERY_FILTERS: &[FilterField] = &[
    SEARCH_FIELD,
    STATUS_FIELD,
    PINNED_FIELD,
    FilterField::new(
        "EventDate",
        "Event date",
        "EventDate",
        FilterKind::DateRange {
            from: "EventDateFrom",
            to: "EventDateTo",
        },
    ),
];

const NEWS_FILTERS: &[FilterField] = &[
    SEARCH_FIELD,
    STATUS_FIELD,
    FilterField::new("Author", "Author", "Author", FilterKind::Text),
    FilterField::new("Tags", "Tags", "Tags", FilterKind::List),
    PINNED_FIELD,
    PUBLISH_RANGE,
];

const VIOLATION_FILTERS: &[FilterField] = &[
    SEARCH_FIELD,
    STATUS_FIELD,
    FilterField::new("Severity", "Severity", "Severity", FilterKind::Choice(SEVERITIES)),
    FilterField::new("Location", "Location", "Location", FilterKind::Text),
    FilterField::new(
        "OccurredAt",
        "Occurred",
        "OccurredAt",
        FilterKind::DateRange {
            from: "OccurredFrom",
            to: "OccurredTo",
        },
    ),
];

const ROLE_FILTERS: &[FilterField] = &[SEARCH_FIELD];

const USER_FILTERS: &[FilterField] = &[
    SEARCH_FIELD,
    FilterField::new("Role", "Role id", "RoleId", FilterKind::Reference),
    FilterField::new("Active", "Active only", "IsActive", FilterKind::Flag),
];

// ── ResourceKind ─────────────────────────────────────────────────────

const CONTENT_TRANSITIONS: &[TransitionKind] = &[
    TransitionKind::Publish,
    TransitionKind::Pin,
    TransitionKind::Unpin,
    TransitionKind::Archive,
];

/// Endpoint descriptor for every entity the console manages.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ResourceKind {
    Announcements,
    Documents,
    Galleries,
    News,
    Violations,
    Roles,
    Users,
}

impl ResourceKind {
    /// Collection path under the API base URL.
    pub fn path(self) -> &'static str {
        self.into()
    }

    /// Plural title for headers and tabs.
    pub fn label(self) -> &'static str {
        match self {
            Self::Announcements => "Announcements",
            Self::Documents => "Documents",
            Self::Galleries => "Galleries",
            Self::News => "News",
            Self::Violations => "Violations",
            Self::Roles => "Roles",
            Self::Users => "Users",
        }
    }

    /// Singular noun for prompts and notifications.
    pub fn singular(self) -> &'static str {
        match self {
            Self::Announcements => "announcement",
            Self::Documents => "document",
            Self::Galleries => "gallery",
            Self::News => "news item",
            Self::Violations => "violation",
            Self::Roles => "role",
            Self::Users => "user",
        }
    }

    pub fn transitions(self) -> &'static [TransitionKind] {
        match self {
            Self::Announcements | Self::Documents | Self::Galleries | Self::News => {
                CONTENT_TRANSITIONS
            }
            Self::Violations => &[TransitionKind::Archive],
            Self::Roles | Self::Users => &[],
        }
    }

    pub fn supports(self, transition: TransitionKind) -> bool {
        self.transitions().contains(&transition)
    }

    pub fn filter_fields(self) -> &'static [FilterField] {
        match self {
            Self::Announcements => ANNOUNCEMENT_FILTERS,
            Self::Documents => DOCUMENT_FILTERS,
            Self::Galleries => GALLERY_FILTERS,
            Self::News => NEWS_FILTERS,
            Self::Violations => VIOLATION_FILTERS,
            Self::Roles => ROLE_FILTERS,
            Self::Users => USER_FILTERS,
        }
    }

    pub fn filter_field(self, key: &str) -> Option<&'static FilterField> {
        self.filter_fields()
            .iter()
            .find(|f| f.key.eq_ignore_ascii_case(key))
    }

    /// Server-side sort keys, in the order the TUI cycles through them.
    pub fn sort_keys(self) -> &'static [&'static str] {
        match self {
            Self::Announcements | Self::News => &["createdAt", "publishAt", "title", "pinnedOrder"],
            Self::Documents => &["createdAt", "title", "pinnedOrder"],
            Self::Galleries => &["eventDate", "createdAt", "title"],
            Self::Violations => &["occurredAt", "severity", "referenceNumber"],
            Self::Roles => &["name"],
            Self::Users => &["username", "email", "lastLoginAt"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_kind_has_search_first() {
        for kind in ResourceKind::iter() {
            assert_eq!(kind.filter_fields()[0].key, SEARCH, "{kind}");
            assert_eq!(kind.filter_fields()[0].param, "SearchTerm");
        }
    }

    #[test]
    fn violations_only_archive() {
        assert!(ResourceKind::Violations.supports(TransitionKind::Archive));
        assert!(!ResourceKind::Violations.supports(TransitionKind::Publish));
        assert!(ResourceKind::Users.transitions().is_empty());
    }

    #[test]
    fn paths_are_lowercase_plurals() {
        assert_eq!(ResourceKind::News.path(), "news");
        assert_eq!(ResourceKind::Galleries.path(), "galleries");
        assert_eq!("USERS".parse::<ResourceKind>().ok(), Some(ResourceKind::Users));
    }

    #[test]
    fn filter_lookup_is_case_insensitive() {
        let field = ResourceKind::Users.filter_field("role").map(|f| f.param);
        assert_eq!(field, Some("RoleId"));
    }
}
