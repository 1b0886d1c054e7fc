//! The scraping pipeline.
//!
//! 1. [`route`] assigns input URLs to sites
//! 2. [`extract_all`] fetches pages and fills `Asset::downloads` and `Site::info_map`
//! 3. [`execute`] writes `_info.json` files and downloads assets, or prints a
//!    dry-run report

mod download;
mod error;
mod extract;
mod progress;
mod report;
mod router;

use std::path::PathBuf;

use crate::config::{Config, ConfigError, expand_location};

pub use download::{DownloadSummary, INFO_FILENAME, execute};
pub use error::EngineError;
pub use extract::{ExtractionSummary, extract_all};
pub use report::dry_run_report;
pub use router::route;

/// Switches of `grab get` that change engine behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// Overwrite destinations that already exist.
    pub force: bool,
    /// Abort on the first fetch or download failure.
    pub strict: bool,
    /// Print what would be written instead of writing it.
    pub dry_run: bool,
    /// Show a progress bar while downloading.
    pub progress: bool,
}

/// Paths every stage of a run works against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Directory relative arguments and locations are resolved against.
    pub working_dir: PathBuf,
    /// Absolute destination root.
    pub location: PathBuf,
}

impl RunContext {
    /// Resolves the configured location against `working_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HomeDir`] when the location starts with `~` and
    /// no home directory is known.
    pub fn new(config: &Config, working_dir: PathBuf) -> Result<Self, ConfigError> {
        let location = expand_location(&config.global.location, &working_dir)?;
        Ok(Self {
            working_dir,
            location,
        })
    }
}
