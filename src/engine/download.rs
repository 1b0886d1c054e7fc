//! Download pass: writes info files and asset downloads to disk.

use std::path::Path;

use tracing::{debug, error, info, instrument, warn};

use super::error::EngineError;
use super::progress::DownloadProgress;
use super::report::dry_run_report;
use super::{Flags, RunContext};
use crate::config::{Asset, Config, Site};
use crate::diag::Diagnostic;
use crate::net::{self, FetchError, FetchOptions, HttpClient};

/// Name of the metadata file written into each resolved subdirectory.
pub const INFO_FILENAME: &str = "_info.json";

/// Outcome of [`execute`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub downloaded: usize,
    /// Destinations left untouched because they already existed.
    pub skipped: usize,
    /// Downloads that failed outside strict mode.
    pub failed: usize,
    pub info_files: usize,
    /// Warnings to show the user once the run is over.
    pub warnings: Vec<Diagnostic>,
}

/// Writes every info record and downloads every pending asset.
///
/// With `flags.dry_run` nothing is written; the report from
/// [`dry_run_report`] is printed to stdout instead.
///
/// # Errors
///
/// Info files that cannot be written always abort the run. Download failures
/// abort only with `flags.strict`.
pub async fn execute(
    config: &Config,
    ctx: &RunContext,
    flags: &Flags,
    client: &HttpClient,
) -> Result<DownloadSummary, EngineError> {
    if flags.dry_run {
        print!("{}", dry_run_report(config, &ctx.location));
        return Ok(DownloadSummary::default());
    }

    let total = config.sites.iter().map(Site::pending_downloads).sum();
    let progress = DownloadProgress::new(flags.progress, total);
    let mut summary = DownloadSummary::default();

    for site in &config.sites {
        summary.info_files += write_info_files(site).await?;

        for asset in &site.assets {
            progress.start(&site.name, &asset.name);
            let result =
                download_asset(config, site, asset, flags, client, &progress, &mut summary).await;
            if let Err(err) = result {
                progress.finish();
                return Err(err);
            }
        }
    }
    progress.finish();

    info!(
        downloaded = summary.downloaded,
        skipped = summary.skipped,
        failed = summary.failed,
        info_files = summary.info_files,
        "download pass complete"
    );
    Ok(summary)
}

/// Writes one `_info.json` per resolved subdirectory of `site`.
async fn write_info_files(site: &Site) -> Result<usize, EngineError> {
    for (subdirectory, record) in &site.info_map {
        tokio::fs::create_dir_all(subdirectory)
            .await
            .map_err(|e| EngineError::io("Could not create directory", subdirectory, e))?;

        let path = subdirectory.join(INFO_FILENAME);
        let json = serde_json::to_string_pretty(record).map_err(|source| EngineError::Encode {
            path: path.clone(),
            source,
        })?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| EngineError::io("Could not write info file", &path, e))?;
        debug!(path = %path.display(), "info file written");
    }
    Ok(site.info_map.len())
}

#[instrument(level = "debug", skip_all, fields(site = %site.name, asset = %asset.name))]
async fn download_asset(
    config: &Config,
    site: &Site,
    asset: &Asset,
    flags: &Flags,
    client: &HttpClient,
    progress: &DownloadProgress,
    summary: &mut DownloadSummary,
) -> Result<(), EngineError> {
    let options = net::merge(
        config.global.network.as_ref(),
        &[site.network.as_ref(), asset.network.as_ref()],
    );

    for (src, dest) in &asset.downloads {
        let outcome = download_one(src, dest, &options, flags, client).await;
        progress.advance();

        match outcome {
            Ok(true) => summary.downloaded += 1,
            Ok(false) => {
                let warning = Diagnostic::warning(
                    "File already exists",
                    format!(
                        "Skipping download of {}.{} into {}",
                        site.name,
                        asset.name,
                        dest.display()
                    ),
                );
                warn!(path = %dest.display(), "destination exists, skipping");
                summary.skipped += 1;
                summary.warnings.push(warning);
            }
            Err(err) if flags.strict => return Err(err),
            Err(err) => {
                error!(error = %err, "download failed");
                summary.failed += 1;
            }
        }
    }
    Ok(())
}

/// Returns `Ok(false)` when the destination exists and `force` is not set.
async fn download_one(
    src: &str,
    dest: &Path,
    options: &FetchOptions,
    flags: &Flags,
    client: &HttpClient,
) -> Result<bool, EngineError> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| EngineError::download(src, dest, FetchError::io(parent, e)))?;
    }

    let exists = tokio::fs::try_exists(dest)
        .await
        .map_err(|e| EngineError::download(src, dest, FetchError::io(dest, e)))?;
    if exists && !flags.force {
        return Ok(false);
    }

    client
        .download(src, dest, options)
        .await
        .map_err(|source| EngineError::download(src, dest, source))?;
    Ok(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    use super::*;
    use crate::config::parse_str;
    use crate::test_support::socket_guard::start_mock_server_or_skip;

    fn config(location: &Path) -> Config {
        let text = format!(
            r#"
            global {{ location = "{}" }}
            site "example" {{
              test = "example"
              asset "image" {{
                pattern = "x"
                capture = 0
              }}
            }}
            "#,
            location.display()
        );
        parse_str(&text, "grab.hcl").unwrap().0
    }

    fn ctx(location: &Path) -> RunContext {
        RunContext {
            working_dir: location.to_path_buf(),
            location: location.to_path_buf(),
        }
    }

    fn queue(config: &mut Config, src: String, dest: PathBuf) {
        config.sites[0].assets[0].downloads.insert(src, dest);
    }

    #[tokio::test]
    async fn test_writes_info_files_as_pretty_json() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = config(temp_dir.path());
        let subdirectory = temp_dir.path().join("example").join("123");
        config.sites[0].info_map.insert(
            subdirectory.clone(),
            [("title".to_string(), "Gallery".to_string())]
                .into_iter()
                .collect(),
        );

        let client = HttpClient::new().unwrap();
        let summary = execute(&config, &ctx(temp_dir.path()), &Flags::default(), &client)
            .await
            .unwrap();

        assert_eq!(summary.info_files, 1);
        let written = std::fs::read_to_string(subdirectory.join(INFO_FILENAME)).unwrap();
        assert_eq!(written, "{\n  \"title\": \"Gallery\"\n}");
    }

    #[tokio::test]
    async fn test_existing_file_is_skipped_without_force() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/img/a.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fresh".to_vec()))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("example").join("a.jpg");
        std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
        std::fs::write(&dest, b"stale").unwrap();

        let mut config = config(temp_dir.path());
        queue(&mut config, format!("{}/img/a.jpg", server.uri()), dest.clone());
        let client = HttpClient::new().unwrap();

        let summary = execute(&config, &ctx(temp_dir.path()), &Flags::default(), &client)
            .await
            .unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.warnings[0].summary, "File already exists");
        assert_eq!(std::fs::read(&dest).unwrap(), b"stale");

        let force = Flags {
            force: true,
            ..Flags::default()
        };
        let summary = execute(&config, &ctx(temp_dir.path()), &force, &client)
            .await
            .unwrap();
        assert_eq!(summary.downloaded, 1);
        assert_eq!(std::fs::read(&dest).unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn test_failed_download_is_counted_unless_strict() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let mut config = config(temp_dir.path());
        let dest = temp_dir.path().join("example").join("gone.jpg");
        queue(&mut config, format!("{}/gone.jpg", server.uri()), dest.clone());
        let client = HttpClient::new().unwrap();

        let summary = execute(&config, &ctx(temp_dir.path()), &Flags::default(), &client)
            .await
            .unwrap();
        assert_eq!(summary.failed, 1);
        assert!(!dest.exists());

        let strict = Flags {
            strict: true,
            ..Flags::default()
        };
        let err = execute(&config, &ctx(temp_dir.path()), &strict, &client)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Download { .. }));
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = config(temp_dir.path());
        let subdirectory = temp_dir.path().join("example");
        config.sites[0].info_map.insert(
            subdirectory.clone(),
            [("k".to_string(), "v".to_string())].into_iter().collect(),
        );
        queue(
            &mut config,
            "http://127.0.0.1:9/a.jpg".to_string(),
            subdirectory.join("a.jpg"),
        );

        let dry_run = Flags {
            dry_run: true,
            ..Flags::default()
        };
        let client = HttpClient::new().unwrap();
        let summary = execute(&config, &ctx(temp_dir.path()), &dry_run, &client)
            .await
            .unwrap();

        assert_eq!(summary, DownloadSummary::default());
        assert!(!subdirectory.exists());
    }
}
