// ── Runtime connection configuration ──
//
// These types describe *how* to reach the administration API. They carry
// credential data and connection tuning, but never touch disk. The CLI/TUI
// builds a `ConnectionConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use portico_api::{Credentials, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

use crate::list::DEFAULT_PAGE_SIZE;

/// How to authenticate with the API.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// Bearer token (`auth_mode = "token"`).
    Bearer(SecretString),
    /// Service API key (`auth_mode = "api-key"`).
    ApiKey(SecretString),
    /// No credentials.
    Anonymous,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed staging servers).
    DangerAcceptInvalid,
}

/// Configuration for one API deployment.
///
/// Built by CLI/TUI, passed to `Controller` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// API base URL (e.g., `https://cms.example.org/api`).
    pub url: Url,
    pub auth: AuthCredentials,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Page size new list stores start with.
    pub page_size: u32,
    /// How long a cached page is served without revalidation.
    pub cache_ttl: Duration,
}

impl ConnectionConfig {
    pub fn new(url: Url, auth: AuthCredentials) -> Self {
        Self {
            url,
            auth,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            page_size: DEFAULT_PAGE_SIZE,
            cache_ttl: Duration::from_secs(30),
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }

    pub(crate) fn credentials(&self) -> Credentials {
        match &self.auth {
            AuthCredentials::Bearer(token) => Credentials::Bearer {
                token: token.clone(),
            },
            AuthCredentials::ApiKey(key) => Credentials::ApiKey { key: key.clone() },
            AuthCredentials::Anonymous => Credentials::Anonymous,
        }
    }
}
