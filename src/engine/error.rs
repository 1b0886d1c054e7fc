//! Error types for the extraction and download passes.

use std::path::PathBuf;

use thiserror::Error;

use crate::diag::Diagnostic;
use crate::net::FetchError;

/// Errors raised while extracting pages or writing results.
///
/// [`EngineError::Fetch`] and [`EngineError::Download`] only abort a run in
/// strict mode. The other variants always abort.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A page body could not be retrieved.
    #[error("failed to fetch page {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    /// A capture, URL or destination could not be resolved.
    #[error("{summary}: {detail}")]
    Extraction { summary: String, detail: String },

    /// An asset could not be written to its destination.
    #[error("failed to download {url} into {}: {source}", dest.display())]
    Download {
        url: String,
        dest: PathBuf,
        #[source]
        source: FetchError,
    },

    /// An info file or its directory could not be written.
    #[error("{summary} {}: {source}", path.display())]
    Io {
        summary: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An info record could not be serialised.
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl EngineError {
    /// Creates a page fetch error.
    pub fn fetch(url: impl Into<String>, source: FetchError) -> Self {
        Self::Fetch {
            url: url.into(),
            source,
        }
    }

    /// Creates an extraction error.
    pub fn extraction(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Extraction {
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    /// Creates an asset download error.
    pub fn download(url: impl Into<String>, dest: impl Into<PathBuf>, source: FetchError) -> Self {
        Self::Download {
            url: url.into(),
            dest: dest.into(),
            source,
        }
    }

    /// Creates a filesystem error for info files.
    pub fn io(summary: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            summary,
            path: path.into(),
            source,
        }
    }

    /// Converts the error into a user-facing diagnostic.
    #[must_use]
    pub fn diagnostic(&self) -> Diagnostic {
        match self {
            Self::Fetch { url, source } => {
                Diagnostic::error("Failed to fetch page", format!("{url}: {source}"))
            }
            Self::Extraction { summary, detail } => Diagnostic::error(summary.clone(), detail.clone()),
            Self::Download { url, dest, source } => Diagnostic::error(
                "Failed to download asset",
                format!("{url}: {source}"),
            )
            .with_subject(dest.display().to_string()),
            Self::Io {
                summary,
                path,
                source,
            } => Diagnostic::error(*summary, format!("{}: {source}", path.display())),
            Self::Encode { path, source } => {
                Diagnostic::error("Failed to encode info", format!("{}: {source}", path.display()))
            }
        }
    }
}
