//! `grab get`: route, extract and download.

use anyhow::Result;
use grab_core::config as grab_config;
use grab_core::engine::{self, Flags, RunContext};
use grab_core::{HttpClient, urls_from_args};
use tracing::{debug, info, warn};

use super::{config_path, current_dir};
use crate::cli::GetArgs;

pub async fn run_get_command(args: &GetArgs) -> Result<()> {
    let working_dir = current_dir()?;
    let path = config_path(args.config.as_deref(), &working_dir)?;
    let (mut config, cache) = grab_config::load(&path).map_err(|e| e.diagnostic())?;
    debug!(path = %path.display(), "configuration loaded");

    let urls = urls_from_args(&args.urls, &working_dir).map_err(|e| e.diagnostic())?;
    let routed = engine::route(&urls, &mut config.sites, &cache);
    if routed == 0 {
        warn!(urls = urls.len(), "no URL matched any site");
        return Ok(());
    }
    info!(urls = urls.len(), routed, "routed URLs to sites");

    let ctx = RunContext::new(&config, working_dir).map_err(|e| e.diagnostic())?;
    let flags = Flags {
        force: args.force,
        strict: args.strict,
        dry_run: args.dry_run,
        progress: args.progress,
    };
    let client = HttpClient::new()?;

    engine::extract_all(&mut config, &cache, &ctx, &flags, &client)
        .await
        .map_err(|e| e.diagnostic())?;
    let summary = engine::execute(&config, &ctx, &flags, &client)
        .await
        .map_err(|e| e.diagnostic())?;

    for warning in &summary.warnings {
        eprint!("{}", warning.render());
    }
    Ok(())
}
