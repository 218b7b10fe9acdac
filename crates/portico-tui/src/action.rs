//! UI actions. Every state change in the app loop goes through one.

use std::sync::Arc;

use portico_core::{CommandResult, CoreError, Notification, ResourceKind};

use crate::screen::ScreenId;

/// Outcome of a write, shared so the action stays `Clone`.
pub type MutationOutcome = Arc<Result<CommandResult, CoreError>>;

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    GoBack,
    ToggleHelp,

    // ── Connection ────────────────────────────────────────────────
    Connected,
    Disconnected(String),

    // ── Data ──────────────────────────────────────────────────────
    /// A list query published a new snapshot.
    QueryUpdated(ResourceKind),
    /// A write started by `kind`'s screen finished.
    MutationFinished(ResourceKind, MutationOutcome),

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
    DismissNotification,
}

impl Action {
    /// The screen a data action belongs to, regardless of which is active.
    pub fn owner(&self) -> Option<ScreenId> {
        match self {
            Self::QueryUpdated(kind) | Self::MutationFinished(kind, _) => {
                Some(ScreenId::from(*kind))
            }
            _ => None,
        }
    }
}
