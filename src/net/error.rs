//! Error types for page fetches and asset downloads.

use std::path::PathBuf;

use thiserror::Error;

/// Failures of a single fetch or download, after all attempts.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },

    /// The request never produced a response, or its body could not be read.
    #[error("network error requesting {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// No response within the configured timeout.
    #[error("timeout requesting {url}")]
    Timeout { url: String },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} requesting {url}")]
    HttpStatus { url: String, status: u16 },

    /// The destination file could not be created or written.
    #[error("IO error writing to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The URL is malformed or not absolute.
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

impl FetchError {
    pub fn client(source: reqwest::Error) -> Self {
        Self::Client { source }
    }

    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }
}
