//! Catalog document sources
//!
//! Two network-facing capabilities feed the catalog load:
//! - [`RemoteStore`]: the shared document, highest precedence, writable
//!   with stored credentials
//! - [`BundledFallback`]: the read-only document shipped with the site
//!
//! Both return the raw list of videos; deciding whether a list is
//! authoritative (non-empty) is the catalog's job, not the source's.
//!
//! # Remote document API
//! - Read: `GET <remote_url>?t=<epoch-millis>` (cache-busting)
//! - Write: `PATCH <api_base>/gists/<id>` with
//!   `{"files": {"<document_file>": {"content": "<json>"}}}`

use crate::config::{RemoteConfig, SourcesConfig};
use crate::models::VideoRecord;
use crate::storage::{KeyValueStore, REMOTE_DOCUMENT_ID_KEY, REMOTE_TOKEN_KEY};
use crate::{time, Error, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// User-Agent header sent with every request (GitHub requires one)
const USER_AGENT: &str = concat!("reel-admin/", env!("CARGO_PKG_VERSION"));

/// Identifier and token for authenticated remote writes
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteCredentials {
    pub document_id: String,
    pub token: String,
}

impl std::fmt::Debug for RemoteCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCredentials")
            .field("document_id", &self.document_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl RemoteCredentials {
    /// Read stored credentials; `None` unless both parts are non-empty
    pub fn load(store: &dyn KeyValueStore) -> Result<Option<Self>> {
        let document_id = store.get(REMOTE_DOCUMENT_ID_KEY)?.unwrap_or_default();
        let token = store.get(REMOTE_TOKEN_KEY)?.unwrap_or_default();

        if document_id.trim().is_empty() || token.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(Self {
            document_id: document_id.trim().to_string(),
            token: token.trim().to_string(),
        }))
    }

    /// Persist credentials for later publishes
    pub fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        store.set(REMOTE_DOCUMENT_ID_KEY, &self.document_id)?;
        store.set(REMOTE_TOKEN_KEY, &self.token)
    }
}

/// Shared remote catalog document
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the current document, bypassing caches
    async fn fetch(&self) -> Result<Vec<VideoRecord>>;

    /// Replace the document content with `document` (serialized catalog)
    async fn write(&self, credentials: &RemoteCredentials, document: &str) -> Result<()>;
}

/// Static catalog document bundled with the site
#[async_trait]
pub trait BundledFallback: Send + Sync {
    async fn fetch(&self) -> Result<Vec<VideoRecord>>;
}

fn build_client(timeout: Duration) -> Result<Client> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::USER_AGENT,
        header::HeaderValue::from_static(USER_AGENT),
    );

    Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Parse a catalog document body
pub fn parse_document(body: &str) -> Result<Vec<VideoRecord>> {
    serde_json::from_str(body).map_err(|e| Error::Parse(format!("Invalid catalog document: {}", e)))
}

async fn get_document(request: reqwest::RequestBuilder, what: &str) -> Result<Vec<VideoRecord>> {
    let response = request
        .send()
        .await
        .map_err(|e| Error::Network(format!("{} request failed: {}", what, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Network(format!("{} returned {}", what, status)));
    }

    let body = response
        .text()
        .await
        .map_err(|e| Error::Network(format!("{} body read failed: {}", what, e)))?;

    parse_document(&body)
}

/// Remote document over HTTP
pub struct HttpRemoteStore {
    client: Client,
    document_url: String,
    api_base: String,
    document_file: String,
}

impl HttpRemoteStore {
    pub fn new(document_url: impl Into<String>, remote: &RemoteConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            document_url: document_url.into(),
            api_base: remote.api_base.trim_end_matches('/').to_string(),
            document_file: remote.document_file.clone(),
        })
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn fetch(&self) -> Result<Vec<VideoRecord>> {
        let cache_buster = time::now_millis();
        debug!(url = %self.document_url, t = cache_buster, "Fetching remote catalog");

        let request = self
            .client
            .get(&self.document_url)
            .query(&[("t", cache_buster)])
            .header(header::CACHE_CONTROL, "no-cache");

        get_document(request, "Remote document").await
    }

    async fn write(&self, credentials: &RemoteCredentials, document: &str) -> Result<()> {
        let url = format!("{}/gists/{}", self.api_base, credentials.document_id);
        debug!(url = %url, bytes = document.len(), "Writing remote catalog");

        let mut files = serde_json::Map::new();
        files.insert(self.document_file.clone(), json!({ "content": document }));
        let body = json!({ "files": files });

        let response = self
            .client
            .patch(&url)
            .header(header::AUTHORIZATION, format!("token {}", credentials.token))
            .header(header::ACCEPT, "application/vnd.github+json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Remote write failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Network(format!(
                "Remote write returned {}: {}",
                status, text
            )));
        }

        Ok(())
    }
}

/// Bundled document read from the local filesystem
pub struct FileFallback {
    path: PathBuf,
}

impl FileFallback {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl BundledFallback for FileFallback {
    async fn fetch(&self) -> Result<Vec<VideoRecord>> {
        debug!(path = %self.path.display(), "Reading bundled catalog");
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::Network(format!("Bundled file {}: {}", self.path.display(), e)))?;
        parse_document(&body)
    }
}

/// Bundled document served as a static URL
pub struct HttpFallback {
    client: Client,
    url: String,
}

impl HttpFallback {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl BundledFallback for HttpFallback {
    async fn fetch(&self) -> Result<Vec<VideoRecord>> {
        debug!(url = %self.url, "Fetching bundled catalog");
        let request = self.client.get(&self.url);
        get_document(request, "Bundled document").await
    }
}

/// Fallback used when no bundled document is configured
pub struct NoFallback;

#[async_trait]
impl BundledFallback for NoFallback {
    async fn fetch(&self) -> Result<Vec<VideoRecord>> {
        Err(Error::Network("no bundled document configured".to_string()))
    }
}

/// Remote used when no remote document is configured
pub struct NoRemote;

#[async_trait]
impl RemoteStore for NoRemote {
    async fn fetch(&self) -> Result<Vec<VideoRecord>> {
        Err(Error::Network("no remote document configured".to_string()))
    }

    async fn write(&self, _credentials: &RemoteCredentials, _document: &str) -> Result<()> {
        Err(Error::Network("no remote document configured".to_string()))
    }
}

/// Build the remote source described by `sources`
pub fn remote_from_config(sources: &SourcesConfig, remote: &RemoteConfig) -> Result<Box<dyn RemoteStore>> {
    match &sources.remote_url {
        Some(url) => Ok(Box::new(HttpRemoteStore::new(url.clone(), remote, sources.read_timeout())?)),
        None => Ok(Box::new(NoRemote)),
    }
}

/// Build the bundled fallback described by `sources` (file wins over URL)
pub fn fallback_from_config(sources: &SourcesConfig) -> Result<Box<dyn BundledFallback>> {
    if let Some(path) = &sources.fallback_path {
        return Ok(Box::new(FileFallback::new(path.clone())));
    }
    if let Some(url) = &sources.fallback_url {
        return Ok(Box::new(HttpFallback::new(url.clone(), sources.read_timeout())?));
    }
    Ok(Box::new(NoFallback))
}
