// Async HTTP client for the Portico administration REST API.
//
// Every entity endpoint shares one layout:
//   GET    {base}/{path}?PageNumber=&PageSize=&…   -> { items, totalItems }
//   GET    {base}/{path}/{id}
//   POST   {base}/{path}                           -> record | empty
//   PUT    {base}/{path}/{id}                      -> record | empty
//   DELETE {base}/{path}/{id}
//   POST   {base}/{path}/{id}/{publish|pin|unpin|archive}

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::FieldErrors;
use crate::transport::TransportConfig;
use crate::types::{Page, PinBody, PublishBody};
use crate::{Credentials, Error};

// ── Error response shape ─────────────────────────────────────────────

/// Error bodies seen in the wild: `{message}`, problem-details style
/// `{title, detail, errors}`, sometimes with a machine `code`.
#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    errors: Option<BTreeMap<String, OneOrMany>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s],
            Self::Many(v) => v,
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the administration API.
///
/// Entity-agnostic: callers pass the collection path (`"announcements"`)
/// and get typed pages back.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    http: reqwest::Client,
    base_url: Url,
    /// Set when this client built `http` itself, so timeouts can be reported.
    timeout: Option<Duration>,
}

impl ResourceClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client that sends `credentials` on every request.
    pub fn new(
        base_url: &str,
        credentials: &Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client_with_headers(credentials.headers()?)?;
        let base_url = Self::normalize_base_url(base_url)?;
        debug!(scheme = credentials.scheme(), %base_url, "resource client ready");
        Ok(Self {
            http,
            base_url,
            timeout: Some(transport.timeout),
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            timeout: None,
        })
    }

    /// Parse the base URL and make sure it can carry path segments.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::UnusableBaseUrl(raw.to_owned()));
        }
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append `path` (split on `/`) and `extra` segments to the base URL.
    ///
    /// Segments are percent-encoded, so IDs never escape their slot.
    fn endpoint(&self, path: &str, extra: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| Error::UnusableBaseUrl(self.base_url.to_string()))?;
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
            segments.extend(extra.iter().copied());
        }
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(String, String)],
    ) -> Result<T, Error> {
        debug!("GET {url} params={params:?}");
        let resp = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;
        Self::handle_response(resp).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        method: reqwest::Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Option<T>, Error> {
        debug!("{method} {url}");
        let mut req = self.http.request(method, url);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await.map_err(|e| self.request_error(e))?;
        Self::handle_optional(resp).await
    }

    /// Timeouts become `Error::Timeout` when the configured limit is known.
    fn request_error(&self, err: reqwest::Error) -> Error {
        match self.timeout {
            Some(limit) if err.is_timeout() => Error::Timeout {
                timeout_secs: limit.as_secs(),
            },
            _ => Error::Transport(err),
        }
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            decode(body)
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    /// Like `handle_response`, but an empty 2xx body yields `None`.
    async fn handle_optional<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<Option<T>, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::parse_error(status, resp).await);
        }
        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        decode(body).map(Some)
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        error_from_body(status, &raw)
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Reads ────────────────────────────────────────────────────────

    /// `GET {path}` with the given query pairs. Repeated keys are allowed.
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<Page<T>, Error> {
        let url = self.endpoint(path, &[])?;
        self.get_with_params(url, params).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, id: &str) -> Result<T, Error> {
        let url = self.endpoint(path, &[id])?;
        self.get_with_params(url, &[]).await
    }

    // ── Writes ───────────────────────────────────────────────────────

    pub async fn create<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>, Error> {
        let url = self.endpoint(path, &[])?;
        self.send_json(reqwest::Method::POST, url, Some(body)).await
    }

    pub async fn update<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        id: &str,
        body: &B,
    ) -> Result<Option<T>, Error> {
        let url = self.endpoint(path, &[id])?;
        self.send_json(reqwest::Method::PUT, url, Some(body)).await
    }

    pub async fn delete(&self, path: &str, id: &str) -> Result<(), Error> {
        let url = self.endpoint(path, &[id])?;
        self.send_json::<serde_json::Value, ()>(reqwest::Method::DELETE, url, None)
            .await
            .map(|_| ())
    }

    // ── State transitions ────────────────────────────────────────────

    /// Publish now, or at `publish_at` (ISO-8601) when scheduling.
    pub async fn publish<T: DeserializeOwned>(
        &self,
        path: &str,
        id: &str,
        publish_at: Option<String>,
    ) -> Result<Option<T>, Error> {
        let body = PublishBody { publish_at };
        self.transition(path, id, "publish", Some(&body)).await
    }

    pub async fn pin<T: DeserializeOwned>(
        &self,
        path: &str,
        id: &str,
        pinned_order: u32,
    ) -> Result<Option<T>, Error> {
        let body = PinBody { pinned_order };
        self.transition(path, id, "pin", Some(&body)).await
    }

    pub async fn unpin<T: DeserializeOwned>(&self, path: &str, id: &str) -> Result<Option<T>, Error> {
        self.transition::<T, ()>(path, id, "unpin", None).await
    }

    pub async fn archive<T: DeserializeOwned>(
        &self,
        path: &str,
        id: &str,
    ) -> Result<Option<T>, Error> {
        self.transition::<T, ()>(path, id, "archive", None).await
    }

    async fn transition<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        id: &str,
        action: &str,
        body: Option<&B>,
    ) -> Result<Option<T>, Error> {
        let url = self.endpoint(path, &[id, action])?;
        self.send_json(reqwest::Method::POST, url, body).await
    }
}

// ── Pagination helper ────────────────────────────────────────────────

/// Collect every page into a single `Vec<T>`.
///
/// `fetch` receives a 1-indexed page number and the page size. Stops on a
/// short page or once `totalItems` records have been collected.
pub async fn paginate_all<T, E, F, Fut>(page_size: u32, fetch: F) -> Result<Vec<T>, E>
where
    F: Fn(u32, u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    let page_size = page_size.max(1);
    let page_size_usize = usize::try_from(page_size).unwrap_or(usize::MAX);
    let mut all = Vec::new();
    let mut page_number: u32 = 1;

    loop {
        let page = fetch(page_number, page_size).await?;
        let received = page.items.len();
        all.extend(page.items);

        if received == 0
            || received < page_size_usize
            || u64::try_from(all.len()).unwrap_or(u64::MAX) >= page.total_items
        {
            break;
        }
        page_number = page_number.saturating_add(1);
    }

    Ok(all)
}

// ── Body decoding ────────────────────────────────────────────────────

fn decode<T: DeserializeOwned>(body: String) -> Result<T, Error> {
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

/// Map a non-2xx response into an [`Error`], extracting whatever
/// message and field errors the server provided.
fn error_from_body(status: reqwest::StatusCode, raw: &str) -> Error {
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Error::Unauthorized;
    }

    let parsed = serde_json::from_str::<ErrorResponse>(raw).ok();
    let (message, code, field_errors) = match parsed {
        Some(err) => {
            let fields: FieldErrors = err
                .errors
                .unwrap_or_default()
                .into_iter()
                .map(|(k, v)| (k, v.into_vec()))
                .collect();
            let message = err
                .message
                .or(err.title)
                .or(err.detail)
                .unwrap_or_else(|| status.to_string());
            (message, err.code, fields)
        }
        None if raw.trim().is_empty() => (status.to_string(), None, FieldErrors::new()),
        None => (raw.to_owned(), None, FieldErrors::new()),
    };

    if status == reqwest::StatusCode::FORBIDDEN {
        return Error::Forbidden { message };
    }

    Error::Api {
        status: status.as_u16(),
        message,
        code,
        field_errors,
    }
}
