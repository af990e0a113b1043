//! Error types for page retrieval.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a paginated fetch.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    /// Transport-level failure (connect, TLS, body read).
    #[error("network error: {0}")]
    Http(String),

    /// The provider answered with a non-success status.
    #[error("request to {url} failed with status {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// Reading or writing a saved page failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The page body was not valid JSON.
    #[error("invalid JSON from {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// The page decoded but is not a `{results, next}` envelope.
    #[error("malformed page from {url}: {message}")]
    MalformedPage {
        /// Requested URL.
        url: String,
        /// What was wrong with the envelope.
        message: String,
    },
}

impl FetchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(url: &str, message: impl Into<String>) -> Self {
        Self::MalformedPage {
            url: url.to_string(),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, FetchError>;
