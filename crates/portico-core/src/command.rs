// ── Command API ──
//
// All write operations flow through a unified `Command`. The controller
// routes each one to the backend; list queries are invalidated by the
// caller once the server confirms.

use serde_json::Value;

use crate::error::CoreError;
use crate::model::{EntityId, Transition};
use crate::resource::ResourceKind;

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// One remote write against a resource collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Create(Value),
    Update { id: EntityId, body: Value },
    Delete { id: EntityId },
    Transition { id: EntityId, transition: Transition },
}

impl Mutation {
    /// Short verb for logs and notifications.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Transition { transition, .. } => transition.kind().into(),
        }
    }

    pub fn target(&self) -> Option<&EntityId> {
        match self {
            Self::Create(_) => None,
            Self::Update { id, .. } | Self::Delete { id } | Self::Transition { id, .. } => Some(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub kind: ResourceKind,
    pub mutation: Mutation,
}

impl Command {
    pub fn new(kind: ResourceKind, mutation: Mutation) -> Self {
        Self { kind, mutation }
    }

    /// Reject transitions the entity does not offer before anything is sent.
    pub(crate) fn check_supported(&self) -> Result<(), CoreError> {
        if let Mutation::Transition { transition, .. } = &self.mutation {
            let kind = transition.kind();
            if !self.kind.supports(kind) {
                return Err(CoreError::Unsupported {
                    operation: format!("{kind} {}", self.kind.singular()),
                    reason: format!("{} do not support {kind}", self.kind.label()),
                });
            }
        }
        Ok(())
    }
}

/// Result of a command execution.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// The server answered with an empty body.
    Ok,
    /// The server echoed the affected record.
    Record(Value),
}

impl CommandResult {
    pub fn record(&self) -> Option<&Value> {
        match self {
            Self::Ok => None,
            Self::Record(value) => Some(value),
        }
    }
}
