//! JSON document retrieval with optional on-disk page cache.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

use crate::error::{FetchError, Result};

/// User agent string for API requests.
const USER_AGENT_VALUE: &str = concat!("ifrc-connector/", env!("CARGO_PKG_VERSION"));

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Source of decoded JSON documents.
///
/// `filename` is the cache name for the document; implementations that
/// keep copies of what they download store it under that name.
pub trait Retriever {
    fn download_json(&self, url: &str, filename: &str) -> Result<Value>;
}

/// How [`HttpRetriever`] treats its saved-data directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetrieveMode {
    /// Download only.
    #[default]
    Live,
    /// Download and keep a copy of every page.
    Save,
    /// Replay previously saved pages without touching the network.
    UseSaved,
}

/// Blocking HTTP retriever for the provider API.
#[derive(Debug)]
pub struct HttpRetriever {
    client: reqwest::blocking::Client,
    mode: RetrieveMode,
    saved_dir: PathBuf,
}

impl HttpRetriever {
    pub fn new(mode: RetrieveMode, saved_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            mode,
            saved_dir: saved_dir.into(),
        })
    }

    #[must_use]
    pub fn mode(&self) -> RetrieveMode {
        self.mode
    }

    #[must_use]
    pub fn saved_dir(&self) -> &Path {
        &self.saved_dir
    }

    fn fetch_text(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "requesting page");
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text()?)
    }

    fn save(&self, filename: &str, body: &str) -> Result<()> {
        fs::create_dir_all(&self.saved_dir).map_err(|e| FetchError::io(&self.saved_dir, e))?;
        let path = self.saved_dir.join(filename);
        fs::write(&path, body).map_err(|e| FetchError::io(&path, e))?;
        tracing::debug!(path = %path.display(), "saved page");
        Ok(())
    }
}

impl Retriever for HttpRetriever {
    fn download_json(&self, url: &str, filename: &str) -> Result<Value> {
        if self.mode == RetrieveMode::UseSaved {
            let path = self.saved_dir.join(filename);
            tracing::debug!(path = %path.display(), url, "using saved page");
            return read_json_file(&path);
        }
        let body = self.fetch_text(url)?;
        let value = serde_json::from_str(&body).map_err(|source| FetchError::Json {
            origin: url.to_string(),
            source,
        })?;
        if self.mode == RetrieveMode::Save {
            self.save(filename, &body)?;
        }
        Ok(value)
    }
}

/// Reads and decodes a saved JSON document.
pub fn read_json_file(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(|e| FetchError::io(path, e))?;
    serde_json::from_str(&text).map_err(|source| FetchError::Json {
        origin: path.display().to_string(),
        source,
    })
}

/// In-memory retriever keyed by URL, for replaying fixed page sets.
#[derive(Debug, Default)]
pub struct MemoryRetriever {
    documents: BTreeMap<String, Value>,
    requested: RefCell<Vec<String>>,
}

impl MemoryRetriever {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_document(mut self, url: impl Into<String>, document: Value) -> Self {
        self.insert(url, document);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, document: Value) {
        self.documents.insert(url.into(), document);
    }

    /// Cache filenames requested so far, in request order.
    #[must_use]
    pub fn requested_filenames(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl Retriever for MemoryRetriever {
    fn download_json(&self, url: &str, filename: &str) -> Result<Value> {
        self.requested.borrow_mut().push(filename.to_string());
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}
