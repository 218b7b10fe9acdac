// ── Domain model ──
//
// Typed record schemas, one module per entity. Each module also owns the
// entity's form and wire payload so they cannot drift apart.

pub mod entity_id;
pub mod lifecycle;

pub mod announcement;
pub mod document;
pub mod gallery;
pub mod news;
pub mod role;
pub mod user;
pub mod violation;

pub use entity_id::EntityId;
pub use lifecycle::{
    MAX_PINNED_ORDER, RecordStatus, RowAction, Transition, TransitionKind, effective_pinned_order,
};

pub use announcement::{Announcement, AnnouncementForm, AnnouncementPayload};
pub use document::{Document, DocumentForm, DocumentPayload};
pub use gallery::{Gallery, GalleryForm, GalleryPayload};
pub use news::{NewsForm, NewsItem, NewsPayload};
pub use role::{Role, RoleForm, RolePayload};
pub use user::{User, UserForm, UserPayload};
pub use violation::{Severity, Violation, ViolationForm, ViolationPayload};
