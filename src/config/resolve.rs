//! Locating the config file and the destination root on disk.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use tracing::{debug, trace};

use super::error::ConfigError;

/// Returns `start/filename`, or the same name in the closest ancestor of
/// `start` that has it.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] when no ancestor contains `filename`.
pub fn find_config(filename: &str, start: &Path) -> Result<PathBuf, ConfigError> {
    for dir in start.ancestors() {
        let candidate = dir.join(filename);
        trace!(path = %candidate.display(), "looking for config file");
        if candidate.is_file() {
            debug!(path = %candidate.display(), "using config file");
            return Ok(candidate);
        }
    }
    Err(ConfigError::NotFound {
        filename: filename.to_string(),
        start: start.to_path_buf(),
    })
}

/// Turns the `location` attribute into an absolute directory.
///
/// A leading `~` expands to the home directory. Paths that are still relative
/// are joined under `working_dir`.
///
/// # Errors
///
/// Returns [`ConfigError::HomeDir`] when `~` is used and no home directory is
/// known.
pub fn expand_location(location: &str, working_dir: &Path) -> Result<PathBuf, ConfigError> {
    let expanded = match location.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with(['/', '\\']) => {
            let home = BaseDirs::new().ok_or_else(|| ConfigError::HomeDir {
                location: location.to_string(),
            })?;
            home.home_dir()
                .join(rest.trim_start_matches(['/', '\\']))
        }
        _ => PathBuf::from(location),
    };

    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(working_dir.join(expanded))
    }
}
