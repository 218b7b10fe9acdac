// ── Record lifecycle ──
//
// Draft → Published → Archived, with an orthogonal pinned flag and a
// terminal delete. The server enforces the machine; the client only uses
// it to decide which actions to offer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Publication status shared by every content entity.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum RecordStatus {
    #[default]
    #[serde(alias = "draft", alias = "DRAFT")]
    Draft,
    #[serde(alias = "published", alias = "PUBLISHED")]
    Published,
    #[serde(alias = "archived", alias = "ARCHIVED")]
    Archived,
}

/// A state transition endpoint (`POST {path}/{id}/{transition}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TransitionKind {
    Publish,
    Pin,
    Unpin,
    Archive,
}

/// A transition together with its request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Publish now (`at == None`) or schedule for later.
    Publish { at: Option<DateTime<Utc>> },
    Pin { order: u32 },
    Unpin,
    Archive,
}

impl Transition {
    pub fn kind(&self) -> TransitionKind {
        match self {
            Self::Publish { .. } => TransitionKind::Publish,
            Self::Pin { .. } => TransitionKind::Pin,
            Self::Unpin => TransitionKind::Unpin,
            Self::Archive => TransitionKind::Archive,
        }
    }
}

/// An action offered on a table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum RowAction {
    Edit,
    Delete,
    Publish,
    Pin,
    Unpin,
    Archive,
}

impl RowAction {
    /// Verb used in confirmation prompts and toasts ("publish", "delete").
    pub fn verb(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Publish => "publish",
            Self::Pin => "pin",
            Self::Unpin => "unpin",
            Self::Archive => "archive",
        }
    }

    /// Past tense for success notifications.
    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Edit => "updated",
            Self::Delete => "deleted",
            Self::Publish => "published",
            Self::Pin => "pinned",
            Self::Unpin => "unpinned",
            Self::Archive => "archived",
        }
    }

    pub fn transition(self) -> Option<TransitionKind> {
        match self {
            Self::Publish => Some(TransitionKind::Publish),
            Self::Pin => Some(TransitionKind::Pin),
            Self::Unpin => Some(TransitionKind::Unpin),
            Self::Archive => Some(TransitionKind::Archive),
            Self::Edit | Self::Delete => None,
        }
    }
}

impl From<TransitionKind> for RowAction {
    fn from(kind: TransitionKind) -> Self {
        match kind {
            TransitionKind::Publish => Self::Publish,
            TransitionKind::Pin => Self::Pin,
            TransitionKind::Unpin => Self::Unpin,
            TransitionKind::Archive => Self::Archive,
        }
    }
}

// ── Pinning ──────────────────────────────────────────────────────────

/// Highest pin slot the API accepts.
pub const MAX_PINNED_ORDER: u32 = 9999;

/// Pin order sent on the wire: unpinned records always carry 0.
pub fn effective_pinned_order(is_pinned: bool, pinned_order: u32) -> u32 {
    if is_pinned { pinned_order } else { 0 }
}
