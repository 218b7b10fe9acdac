//! CLI configuration: thin layer over `portico_config`.
//!
//! Adds resolution that respects `GlobalOpts` overrides (--api-url,
//! --token, --insecure, --timeout) on top of the active profile.

use std::time::Duration;

use secrecy::SecretString;

use portico_core::{AuthCredentials, ConnectionConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use portico_config::{Config, Defaults, Profile, config_path, load_config_or_default};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// "a, b, c", or "(none)".
pub fn available_profiles(config: &Config) -> String {
    let names = config.profile_names();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}

/// Build a `ConnectionConfig` from the config file, profile, and flags.
///
/// Flags win over the profile, the profile wins over `[defaults]`.
pub fn build_connection_config(global: &GlobalOpts) -> Result<ConnectionConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, &cfg.defaults, global);
    }

    // An explicitly requested profile must exist.
    if let Some(ref name) = global.profile {
        return Err(CliError::ProfileNotFound {
            name: name.clone(),
            available: available_profiles(&cfg),
        });
    }

    // No profile -- build from flags / env vars alone.
    let url_str = global.api_url.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let url = portico_config::parse_api_url(url_str)?;

    let auth = match global.token {
        Some(ref token) => AuthCredentials::Bearer(SecretString::from(token.clone())),
        None => {
            return Err(CliError::NoCredentials {
                profile: profile_name,
            });
        }
    };

    let mut config = ConnectionConfig::new(url, auth);
    config.tls = if global.insecure || cfg.defaults.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };
    config.timeout = Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout));
    config.page_size = cfg.defaults.page_size.max(1);
    Ok(config)
}

/// Translate a `Profile` + global flags into a `ConnectionConfig`.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<ConnectionConfig, CliError> {
    // 1. URL (flag > env > profile)
    let url_str = global.api_url.as_deref().unwrap_or(&profile.api_url);
    let url = portico_config::parse_api_url(url_str)?;

    // 2. Credentials (flag > token_env > keyring > plaintext)
    let auth = match global.token {
        Some(ref token) => {
            portico_config::auth_with_secret(profile, SecretString::from(token.clone()))
        }
        None => portico_config::resolve_auth(profile, profile_name)?,
    };

    // 3. TLS
    let tls = if global.insecure || profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    // 4. Timeout and page size
    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(defaults.timeout);

    let mut config = ConnectionConfig::new(url, auth);
    config.tls = tls;
    config.timeout = Duration::from_secs(timeout);
    config.page_size = profile.page_size.unwrap_or(defaults.page_size).max(1);
    Ok(config)
}
