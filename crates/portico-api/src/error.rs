use std::collections::BTreeMap;

use thiserror::Error;

/// Field-level validation messages returned by the API, keyed by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Top-level error type for the `portico-api` crate.
///
/// Covers authentication, transport, and structured API failures.
/// `portico-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The API rejected the credentials (HTTP 401).
    #[error("Unauthorized -- token missing, expired, or invalid")]
    Unauthorized,

    /// The credentials are valid but lack permission (HTTP 403).
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Credential material could not be turned into a header.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The base URL cannot carry path segments (e.g. `mailto:`).
    #[error("Base URL cannot be used for API requests: {0}")]
    UnusableBaseUrl(String),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Structured error returned by the API.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        code: Option<String>,
        field_errors: FieldErrors,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if re-authenticating might resolve this error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Api { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Extract the API error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Field-level validation errors attached to the response, if any.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Api { field_errors, .. } if !field_errors.is_empty() => Some(field_errors),
            _ => None,
        }
    }

    /// The message the server sent, without transport decoration.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } | Self::Forbidden { message } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_exposes_remote_message_and_fields() {
        let mut fields = FieldErrors::new();
        fields.insert("title".into(), vec!["Title is required".into()]);
        let err = Error::Api {
            status: 422,
            message: "Validation failed".into(),
            code: Some("validation".into()),
            field_errors: fields,
        };

        assert_eq!(err.remote_message(), Some("Validation failed"));
        assert_eq!(err.api_error_code(), Some("validation"));
        assert_eq!(err.field_errors().map(BTreeMap::len), Some(1));
        assert!(!err.is_not_found());
    }

    #[test]
    fn empty_field_map_is_reported_as_none() {
        let err = Error::Api {
            status: 404,
            message: "Not Found".into(),
            code: None,
            field_errors: FieldErrors::new(),
        };
        assert!(err.field_errors().is_none());
        assert!(err.is_not_found());
    }

    #[test]
    fn gateway_errors_are_transient() {
        let err = Error::Api {
            status: 503,
            message: "unavailable".into(),
            code: None,
            field_errors: FieldErrors::new(),
        };
        assert!(err.is_transient());
        assert!(!Error::Unauthorized.is_transient());
        assert!(Error::Unauthorized.is_auth_error());
    }
}
