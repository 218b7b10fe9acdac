use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::Error;

const API_KEY_HEADER: &str = "X-API-KEY";

/// Credentials for authenticating with the administration API.
///
/// Each variant carries the secret material for its header scheme.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// `Authorization: Bearer <token>`.
    Bearer { token: SecretString },
    /// `X-API-KEY: <key>` for service accounts.
    ApiKey { key: SecretString },
    /// No credentials (public read-only deployments, tests).
    Anonymous,
}

impl Credentials {
    /// Default headers to attach to every request for this credential.
    ///
    /// Secret values are flagged sensitive so they never show up in
    /// reqwest's debug output.
    pub fn headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        match self {
            Self::Bearer { token } => {
                let value = sensitive(&format!("Bearer {}", token.expose_secret()))?;
                headers.insert(AUTHORIZATION, value);
            }
            Self::ApiKey { key } => {
                let value = sensitive(key.expose_secret())?;
                headers.insert(HeaderName::from_static("x-api-key"), value);
            }
            Self::Anonymous => {}
        }
        Ok(headers)
    }

    /// Human-readable scheme name for logs (never includes the secret).
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Bearer { .. } => "bearer",
            Self::ApiKey { .. } => API_KEY_HEADER,
            Self::Anonymous => "anonymous",
        }
    }
}

fn sensitive(raw: &str) -> Result<HeaderValue, Error> {
    let mut value = HeaderValue::from_str(raw).map_err(|e| Error::Authentication {
        message: format!("invalid credential header value: {e}"),
    })?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_is_sensitive() {
        let creds = Credentials::Bearer {
            token: SecretString::from("abc123".to_string()),
        };
        let headers = creds.headers().unwrap();
        let value = headers.get(AUTHORIZATION).unwrap();
        assert!(value.is_sensitive());
        assert_eq!(value.to_str().unwrap(), "Bearer abc123");
    }

    #[test]
    fn api_key_uses_custom_header() {
        let creds = Credentials::ApiKey {
            key: SecretString::from("k-1".to_string()),
        };
        let headers = creds.headers().unwrap();
        assert_eq!(headers.get("x-api-key").unwrap().to_str().unwrap(), "k-1");
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn newline_in_token_is_rejected() {
        let creds = Credentials::Bearer {
            token: SecretString::from("bad\ntoken".to_string()),
        };
        assert!(matches!(
            creds.headers(),
            Err(Error::Authentication { .. })
        ));
    }

    #[test]
    fn anonymous_sends_nothing() {
        assert!(Credentials::Anonymous.headers().unwrap().is_empty());
    }
}
