// ── Core error types ──
//
// User-facing errors from portico-core. Consumers never see raw HTTP
// plumbing: the `From<portico_api::Error>` impl translates transport-layer
// failures into domain-appropriate variants.

use portico_api::FieldErrors;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not connected")]
    ControllerDisconnected,

    #[error("Request timed out{}", after_secs(*.timeout_secs))]
    Timeout { timeout_secs: Option<u64> },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Could not decode {entity}: {message}")]
    Decode { entity: String, message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation not supported: {operation} ({reason})")]
    Unsupported { operation: String, reason: String },

    #[error("Operation rejected: {message}")]
    Rejected { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed {
        message: String,
        field_errors: FieldErrors,
    },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        code: Option<String>,
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The message the server sent, if this error came from a response body.
    ///
    /// Notifications prefer this over the decorated `Display` text.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message }
            | Self::Conflict { message }
            | Self::ValidationFailed { message, .. }
            | Self::Api { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Field-level messages attached to a rejected write.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::ValidationFailed { field_errors, .. } if !field_errors.is_empty() => {
                Some(field_errors)
            }
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Api { status: Some(404), .. }
        )
    }

    /// Re-label a generic 404 with the entity that was being looked up.
    pub(crate) fn for_entity(self, entity_type: &str, identifier: &str) -> Self {
        if self.is_not_found() {
            Self::NotFound {
                entity_type: entity_type.to_owned(),
                identifier: identifier.to_owned(),
            }
        } else {
            self
        }
    }
}

fn after_secs(secs: Option<u64>) -> String {
    secs.map(|s| format!(" after {s}s")).unwrap_or_default()
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<portico_api::Error> for CoreError {
    fn from(err: portico_api::Error) -> Self {
        match err {
            portico_api::Error::Unauthorized => CoreError::AuthenticationFailed {
                message: "token missing, expired, or invalid".into(),
            },
            portico_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            portico_api::Error::Forbidden { message } => CoreError::Rejected { message },
            portico_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: None }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            portico_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            portico_api::Error::UnusableBaseUrl(url) => CoreError::Config {
                message: format!("URL cannot be used as an API base: {url}"),
            },
            portico_api::Error::Timeout { timeout_secs } => CoreError::Timeout {
                timeout_secs: Some(timeout_secs),
            },
            portico_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            portico_api::Error::Api {
                status: 409,
                message,
                ..
            } => CoreError::Conflict { message },
            portico_api::Error::Api {
                status,
                message,
                field_errors,
                ..
            } if matches!(status, 400 | 422) && !field_errors.is_empty() => {
                CoreError::ValidationFailed {
                    message,
                    field_errors,
                }
            }
            portico_api::Error::Api {
                status,
                message,
                code,
                ..
            } => CoreError::Api {
                message,
                code,
                status: Some(status),
            },
            portico_api::Error::Deserialization { message, body: _ } => CoreError::Decode {
                entity: "response".into(),
                message,
            },
        }
    }
}
