//! Grab Core Library
//!
//! Config-driven scraping: a `grab.hcl` file declares sites, the regular
//! expressions that find assets and metadata on their pages, and where the
//! results go on disk.
//!
//! # Architecture
//!
//! - [`config`] - HCL decoding, validation and the compiled regex cache
//! - [`capture`] - capture-group selection against compiled patterns
//! - [`net`] - network option folding and the HTTP fetch/download client
//! - [`parser`] - `grab get` arguments into page URLs
//! - [`engine`] - routing, extraction, and the download pass
//! - [`diag`] - user-facing diagnostics every error converts into

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod capture;
pub mod config;
pub mod diag;
pub mod engine;
pub mod net;
pub mod parser;
#[cfg(test)]
pub(crate) mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use capture::{CaptureError, CaptureSelector};
pub use config::{Config, ConfigError, DEFAULT_CONFIG_FILENAME, RegexCache};
pub use diag::{Diagnostic, Severity};
pub use engine::{DownloadSummary, EngineError, ExtractionSummary, Flags, RunContext};
pub use net::{FetchError, FetchOptions, HttpClient};
pub use parser::{ArgumentError, urls_from_args};
