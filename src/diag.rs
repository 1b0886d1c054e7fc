//! User-facing diagnostics.
//!
//! Every error the library returns can be turned into a [`Diagnostic`], which
//! the CLI renders as a bordered block on stderr:
//!
//! ```text
//! ╷ Error: Invalid regex pattern
//! │   regex parse error: unclosed group
//! ╵   site "example".asset "image".pattern
//! ```

use std::fmt;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("Error"),
            Self::Warning => f.write_str("Warning"),
        }
    }
}

/// A structured diagnostic: severity, one-line summary, detail, and an
/// optional subject (a config location, a `file:line`, or a URL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    pub subject: Option<String>,
}

impl Diagnostic {
    /// Creates an error diagnostic without a subject.
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
            subject: None,
        }
    }

    /// Creates a warning diagnostic without a subject.
    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(summary, detail)
        }
    }

    /// Attaches a subject to the diagnostic.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Renders the diagnostic as the multi-line block printed to stderr.
    #[must_use]
    pub fn render(&self) -> String {
        let head = format!("╷ {}: {}", self.severity, self.summary);
        match &self.subject {
            Some(subject) => format!("{head}\n│   {}\n╵   {subject}\n", self.detail),
            None => format!("{head}\n╵   {}\n", self.detail),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.summary, self.detail)?;
        if let Some(subject) = &self.subject {
            write!(f, " ({subject})")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}
