//! Error types for configuration loading.

use std::path::PathBuf;

use thiserror::Error;

use crate::diag::Diagnostic;

/// Errors raised while locating, reading, decoding or validating `grab.hcl`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No config file in the start directory or any of its ancestors.
    #[error("could not resolve {filename} from {}", start.display())]
    NotFound {
        filename: String,
        start: PathBuf,
    },

    /// The config file could not be read.
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The text is not valid HCL.
    #[error("failed to parse {filename}: {message}")]
    Syntax { filename: String, message: String },

    /// A structural or business rule was violated.
    #[error("{summary}: {detail}")]
    Invalid {
        summary: String,
        detail: String,
        subject: Option<String>,
    },

    /// A pattern literal failed to compile.
    #[error("invalid regex pattern {pattern:?} at {subject}: {source}")]
    Regex {
        pattern: String,
        subject: String,
        #[source]
        source: regex::Error,
    },

    /// `~` was used in the location but the home directory is unknown.
    #[error("could not expand home directory in {location}")]
    HomeDir { location: String },
}

impl ConfigError {
    /// Creates a rule violation located at `subject`. An empty subject means
    /// the top level of the file.
    pub fn invalid(
        summary: impl Into<String>,
        detail: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        let subject = subject.into();
        Self::Invalid {
            summary: summary.into(),
            detail: detail.into(),
            subject: (!subject.is_empty()).then_some(subject),
        }
    }

    /// Creates a read error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a regex compilation error.
    pub fn regex(
        pattern: impl Into<String>,
        subject: impl Into<String>,
        source: regex::Error,
    ) -> Self {
        Self::Regex {
            pattern: pattern.into(),
            subject: subject.into(),
            source,
        }
    }

    /// Prefixes the subject with the file it came from.
    #[must_use]
    pub fn in_file(self, filename: &str) -> Self {
        match self {
            Self::Invalid {
                summary,
                detail,
                subject,
            } => Self::Invalid {
                summary,
                detail,
                subject: Some(match subject {
                    Some(subject) => format!("{filename}: {subject}"),
                    None => filename.to_string(),
                }),
            },
            Self::Regex {
                pattern,
                subject,
                source,
            } => Self::Regex {
                pattern,
                subject: format!("{filename}: {subject}"),
                source,
            },
            other => other,
        }
    }

    /// Converts the error into a user-facing diagnostic.
    #[must_use]
    pub fn diagnostic(&self) -> Diagnostic {
        match self {
            Self::NotFound { .. } => {
                Diagnostic::error("Could not resolve config file", self.to_string())
            }
            Self::Read { source, .. } => {
                Diagnostic::error("Could not read config file", source.to_string())
            }
            Self::Syntax { filename, message } => {
                Diagnostic::error("Invalid configuration syntax", message.clone())
                    .with_subject(filename.clone())
            }
            Self::Invalid {
                summary,
                detail,
                subject,
            } => {
                let diag = Diagnostic::error(summary.clone(), detail.clone());
                match subject {
                    Some(subject) => diag.with_subject(subject.clone()),
                    None => diag,
                }
            }
            Self::Regex {
                pattern,
                subject,
                source,
            } => Diagnostic::error(
                "Invalid regex pattern",
                format!("{pattern:?} could not be compiled: {source}"),
            )
            .with_subject(subject.clone()),
            Self::HomeDir { location } => Diagnostic::error(
                "Could not expand home directory",
                format!("no home directory available to expand {location:?}"),
            ),
        }
    }
}
