// ── Notifications ──
//
// Transient messages produced by mutation outcomes. Rendering (toast,
// stderr line) is the consumer's business.

use crate::error::CoreError;

/// Shown when a failure carries no usable server message.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    /// Error notification with the server's message when it sent one,
    /// `fallback` otherwise.
    pub fn from_error(err: &CoreError, fallback: &str) -> Self {
        let message = err
            .remote_message()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback);
        Self::error(message)
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}
