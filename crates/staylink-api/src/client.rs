// Marketplace HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, bearer auth read from the
// shared session slot, `{data}` envelope unwrapping, and status-code
// classification. Endpoint groups (categories, markup, housekeeping,
// loyalty) are inherent methods implemented in sibling modules.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::auth::SessionSlot;
use crate::error::Error;
use crate::models::{ErrorBody, MaybeWrapped};
use crate::transport::TransportConfig;

/// Longest body excerpt carried in error messages.
const BODY_PREVIEW: usize = 200;

/// Async client for the marketplace REST backend.
///
/// All paths are relative to the configured base URL (e.g.
/// `https://api.example.com/api/`). Every request carries the bearer token
/// of the session currently installed in the [`SessionSlot`]; an HTTP 401
/// clears that slot before the error is returned.
#[derive(Debug, Clone)]
pub struct MarketplaceClient {
    http: reqwest::Client,
    base_url: Url,
    session: SessionSlot,
}

impl MarketplaceClient {
    /// Build a client from a transport config.
    pub fn new(
        base_url: &str,
        session: SessionSlot,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(base_url, http, session)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        base_url: &str,
        http: reqwest::Client,
        session: SessionSlot,
    ) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The session slot this client authenticates from.
    pub fn session(&self) -> &SessionSlot {
        &self.session
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"service/categories"`) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    fn authorized(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, Error> {
        let session = self.session.current().ok_or(Error::NotAuthenticated)?;
        Ok(builder.header(reqwest::header::AUTHORIZATION, session.bearer()))
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.authorized(self.http.get(url))?.send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.authorized(self.http.post(url).json(body))?.send().await?;
        self.handle_response(resp).await
    }

    /// POST without a body (the activate/deactivate endpoints take none).
    ///
    /// The reply is decoded as-is, without `{data}` unwrapping, since these
    /// bodies may carry a top-level `message` next to `data`.
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.authorized(self.http.post(url))?.send().await?;
        let body = self.success_body(resp).await?;
        decode(&body)
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.authorized(self.http.put(url).json(body))?.send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.authorized(self.http.delete(url))?.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        Err(self.classify_failure(resp).await)
    }

    // ── Response handling ────────────────────────────────────────────

    /// Decode a success body (bare or `{data}`-wrapped), or classify the
    /// failure status.
    async fn handle_response<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let body = self.success_body(resp).await?;
        decode::<MaybeWrapped<T>>(&body).map(MaybeWrapped::into_inner)
    }

    async fn success_body(&self, resp: reqwest::Response) -> Result<String, Error> {
        if !resp.status().is_success() {
            return Err(self.classify_failure(resp).await);
        }

        let body = resp.text().await?;
        // Some endpoints answer 200 with an empty body.
        if body.trim().is_empty() {
            return Ok("null".to_owned());
        }
        Ok(body)
    }

    async fn classify_failure(&self, resp: reqwest::Response) -> Error {
        let status = resp.status();
        let path = resp.url().path().to_owned();
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or_else(|| preview(&body).to_owned());

        match status.as_u16() {
            401 => {
                // Global policy: a rejected token is dead everywhere.
                if self.session.clear() {
                    warn!(%path, "backend rejected session token; session cleared");
                }
                Error::Unauthorized { message }
            }
            403 => Error::Forbidden { message },
            404 => Error::NotFound { path, message },
            code @ 500..=599 => Error::Server {
                status: code,
                message,
            },
            code => Error::Api {
                status: code,
                message,
            },
        }
    }
}

/// Ensure the base URL ends with `/` so relative joins keep its path.
fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(BODY_PREVIEW) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
