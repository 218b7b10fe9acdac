// portico-core: Generic list-resource engine between portico-api and consumers (CLI/TUI).

pub mod backend;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod list;
pub mod modal;
pub mod model;
pub mod notification;
pub mod query;
pub mod resource;
pub mod validation;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::Backend;
pub use command::{Command, CommandResult, Mutation};
pub use config::{AuthCredentials, ConnectionConfig, TlsVerification};
pub use controller::{ConnectionState, Controller};
pub use error::CoreError;
pub use form::{FieldKind, FieldSpec, FormMode, RecordForm};
pub use list::{
    FilterPanel, FilterState, FilterValue, ListState, ListStore, ListView, PageInfo,
    RequestParams, Sort, SortOrder, TableState,
};
pub use modal::{ConfirmInput, ConfirmModal, FormModal, Invalidate, run_mutation};
pub use notification::{Notification, NotificationLevel};
pub use query::{QuerySnapshot, QueryStream, ResourceQuery, ResultSet};
pub use resource::{FilterField, FilterKind, Resource, ResourceKind};
pub use validation::ValidationErrors;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Content entities
    Announcement, Document, Gallery, NewsItem, Violation,
    // Access control
    Role, User,
    // Lifecycle and identity
    EntityId, RecordStatus, RowAction, Severity, Transition, TransitionKind,
};
