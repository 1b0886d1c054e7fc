//! Capture-group resolution.
//!
//! A capture selector is written as text in the config (`capture = 1` or
//! `capture = "id"`). It is interpreted against the compiled pattern at the
//! point of use: patterns with named groups are looked up by name, patterns
//! without named groups take a numeric index.

use regex::{Captures, Regex};
use thiserror::Error;

/// Errors from [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The pattern has named groups but none with this name.
    #[error("capture `{capture}` not found in expression `{pattern}`")]
    NotFound { capture: String, pattern: String },

    /// The pattern has no named groups and the selector is not an index.
    #[error("capture group `{capture}` is not a number")]
    NotANumber { capture: String },

    /// The index is past the last group of the pattern.
    #[error("capture group {index} does not exist in expression `{pattern}` ({groups} groups)")]
    OutOfRange {
        index: usize,
        groups: usize,
        pattern: String,
    },

    /// Nothing was captured.
    #[error("no captures found for pattern `{pattern}`, capture `{capture}`")]
    NoCaptures { pattern: String, capture: String },
}

/// A selector resolved against a specific pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureSelector {
    ByIndex(usize),
    ByName(String),
}

impl CaptureSelector {
    /// Interprets `capture` against the group table of `regex`.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::NotFound`] for an unknown name,
    /// [`CaptureError::NotANumber`] for a non-numeric selector on an unnamed
    /// pattern, and [`CaptureError::OutOfRange`] for an index past the last group.
    pub fn for_pattern(regex: &Regex, capture: &str) -> Result<Self, CaptureError> {
        let mut names = regex.capture_names().flatten().peekable();
        if names.peek().is_some() {
            return if names.any(|name| name == capture) {
                Ok(Self::ByName(capture.to_string()))
            } else {
                Err(CaptureError::NotFound {
                    capture: capture.to_string(),
                    pattern: regex.as_str().to_string(),
                })
            };
        }

        let index: usize = capture
            .trim()
            .parse()
            .map_err(|_| CaptureError::NotANumber {
                capture: capture.to_string(),
            })?;
        if index >= regex.captures_len() {
            return Err(CaptureError::OutOfRange {
                index,
                groups: regex.captures_len() - 1,
                pattern: regex.as_str().to_string(),
            });
        }
        Ok(Self::ByIndex(index))
    }

    fn select(&self, caps: &Captures<'_>) -> Option<String> {
        let group = match self {
            Self::ByIndex(index) => caps.get(*index),
            Self::ByName(name) => caps.name(name),
        };
        group.map(|m| m.as_str().to_string())
    }
}

/// Collects the selected group from the first match, or from every match in
/// order when `find_all` is set.
///
/// Groups that did not take part in a match are skipped.
///
/// # Errors
///
/// Fails when the selector does not fit the pattern, or when nothing was
/// captured ([`CaptureError::NoCaptures`]).
pub fn resolve(
    regex: &Regex,
    find_all: bool,
    capture: &str,
    subject: &str,
) -> Result<Vec<String>, CaptureError> {
    let selector = CaptureSelector::for_pattern(regex, capture)?;

    let values: Vec<String> = if find_all {
        regex
            .captures_iter(subject)
            .filter_map(|caps| selector.select(&caps))
            .collect()
    } else {
        regex
            .captures(subject)
            .and_then(|caps| selector.select(&caps))
            .into_iter()
            .collect()
    };

    if values.is_empty() {
        return Err(CaptureError::NoCaptures {
            pattern: regex.as_str().to_string(),
            capture: capture.to_string(),
        });
    }
    Ok(values)
}
