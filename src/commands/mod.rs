//! CLI command handlers.

mod config;
mod get;

use std::path::{Path, PathBuf};

use anyhow::Result;
use grab_core::Diagnostic;
use grab_core::config::{self as grab_config, DEFAULT_CONFIG_FILENAME};

pub use config::{run_config_check_command, run_config_find_command};
pub use get::run_get_command;

/// The `--config` path resolved against `working_dir`, or the closest
/// `grab.hcl` at or above it.
fn config_path(explicit: Option<&Path>, working_dir: &Path) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(working_dir.join(path)),
        None => grab_config::find_config(DEFAULT_CONFIG_FILENAME, working_dir)
            .map_err(|e| e.diagnostic().into()),
    }
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| {
        Diagnostic::error("Could not read working directory", e.to_string()).into()
    })
}
