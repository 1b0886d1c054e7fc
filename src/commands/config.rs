//! Config command handlers: validate and locate `grab.hcl`.

use std::path::Path;

use anyhow::Result;
use grab_core::Diagnostic;
use grab_core::config::{self as grab_config, DEFAULT_CONFIG_FILENAME};
use tracing::info;

use super::{config_path, current_dir};

/// Parses and validates the config file, printing `ok` when it is usable.
pub fn run_config_check_command(config: Option<&Path>) -> Result<()> {
    let working_dir = current_dir()?;
    let path = config_path(config, &working_dir)?;
    let (parsed, cache) = grab_config::load(&path).map_err(|e| e.diagnostic())?;

    info!(
        path = %path.display(),
        sites = parsed.sites.len(),
        patterns = cache.len(),
        "configuration is valid"
    );
    println!("ok");
    Ok(())
}

/// Prints the closest `grab.hcl` at or above `start` (default: working directory).
pub fn run_config_find_command(start: Option<&Path>) -> Result<()> {
    let working_dir = current_dir()?;
    let start = start.map_or_else(|| working_dir.clone(), |path| working_dir.join(path));
    if !start.is_dir() {
        return Err(Diagnostic::error(
            "Invalid path",
            format!("{} is not a directory", start.display()),
        )
        .into());
    }

    let path = grab_config::find_config(DEFAULT_CONFIG_FILENAME, &start)
        .map_err(|e| e.diagnostic())?;
    println!("{}", path.display());
    Ok(())
}
