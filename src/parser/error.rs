//! Error types for command-line argument parsing.

use std::path::PathBuf;

use thiserror::Error;

use crate::diag::Diagnostic;

/// Errors raised while turning `grab get` arguments into URLs.
#[derive(Debug, Error)]
pub enum ArgumentError {
    /// The argument is neither an existing file nor an absolute URL.
    #[error("the argument '{arg}' is not a valid url, nor a file")]
    InvalidArgument { arg: String },

    /// A line of a URL list file is not an absolute URL.
    #[error("the string '{value}' is not a valid url ({}:{line})", file.display())]
    InvalidUrl {
        value: String,
        file: PathBuf,
        line: usize,
    },

    /// A URL list file exists but could not be read.
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ArgumentError {
    /// Converts the error into a user-facing diagnostic.
    #[must_use]
    pub fn diagnostic(&self) -> Diagnostic {
        match self {
            Self::InvalidArgument { arg } => Diagnostic::error(
                "Invalid argument",
                format!("The argument '{arg}' is not a valid url, nor a file."),
            ),
            Self::InvalidUrl { value, file, line } => Diagnostic::error(
                "Invalid URL",
                format!("The string '{value}' is not a valid url."),
            )
            .with_subject(format!("{}:{line}", file.display())),
            Self::Read { path, source } => Diagnostic::error(
                "Invalid argument",
                format!("The file {} could not be read: {source}", path.display()),
            ),
        }
    }
}
