//! Configuration loading for `grab.hcl`.
//!
//! Loading runs in fixed phases, each stopping at its first error:
//!
//! 1. HCL parsing
//! 2. structural decoding against the block schema
//! 3. business rules ([`validate`])
//! 4. regex compilation into a [`RegexCache`]

mod context;
mod decode;
mod error;
mod model;
mod regex_cache;
mod resolve;
mod validate;

use std::path::Path;

use tracing::debug;

pub use context::{evaluation_context, evaluation_context_with};
pub use error::ConfigError;
pub use model::{
    Asset, CaptureSource, Config, Global, Info, InfoRecord, NetworkOverride, RootNetwork, Site,
    Subdirectory, Transform, TransformKind,
};
pub use regex_cache::RegexCache;
pub use resolve::{expand_location, find_config};

/// File name searched for when no `--config` is given.
pub const DEFAULT_CONFIG_FILENAME: &str = "grab.hcl";

/// Parses configuration text using the process environment for `env.*`.
///
/// `filename` only labels diagnostics.
///
/// # Errors
///
/// Returns the first syntax, schema, rule or regex error found.
pub fn parse_str(text: &str, filename: &str) -> Result<(Config, RegexCache), ConfigError> {
    let body = hcl::parse(text).map_err(|e| ConfigError::Syntax {
        filename: filename.to_string(),
        message: e.to_string(),
    })?;

    let ctx = evaluation_context();
    let config = decode::decode(&body, &ctx).map_err(|e| e.in_file(filename))?;
    validate::validate(&config).map_err(|e| e.in_file(filename))?;
    let cache = RegexCache::build(&config).map_err(|e| e.in_file(filename))?;

    debug!(
        sites = config.sites.len(),
        patterns = cache.len(),
        "configuration loaded"
    );
    Ok((config, cache))
}

/// Reads and parses the config file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] if the file cannot be read, otherwise the
/// errors of [`parse_str`].
pub fn load(path: &Path) -> Result<(Config, RegexCache), ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
    parse_str(&text, &path.display().to_string())
}
