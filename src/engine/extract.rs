//! Page extraction: turns routed page URLs into download maps and info records.
//!
//! For each page the pass computes the page origin, fetches the body with the
//! global∘site options, resolves the destination subdirectory, then runs every
//! asset and info rule against the body. Results accumulate on the config:
//! `Asset::downloads` and `Site::info_map`.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use regex::Regex;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, error, info, instrument};
use url::Url;

use super::error::EngineError;
use super::{Flags, RunContext};
use crate::capture::{self, CaptureError};
use crate::config::{
    Asset, CaptureSource, Config, Info, InfoRecord, RegexCache, Site, TransformKind,
};
use crate::net::{self, HttpClient};

/// Counters reported by [`extract_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub pages_fetched: usize,
    /// Pages whose fetch failed outside strict mode.
    pub pages_skipped: usize,
    /// Download pairs added, summed over every page.
    pub pending_downloads: usize,
}

/// Visits every routed URL of every site, in order.
///
/// # Errors
///
/// A fetch failure is returned only when `flags.strict` is set; otherwise the
/// page is skipped. Extraction errors (unparsable URLs, capture failures,
/// undecodable destinations) are always returned.
pub async fn extract_all(
    config: &mut Config,
    cache: &RegexCache,
    ctx: &RunContext,
    flags: &Flags,
    client: &HttpClient,
) -> Result<ExtractionSummary, EngineError> {
    let Config { global, sites } = config;
    let mut summary = ExtractionSummary::default();

    for site in sites.iter_mut() {
        let options = net::merge(global.network.as_ref(), &[site.network.as_ref()]);

        for page_url in site.urls.clone() {
            let origin = page_origin(&page_url)?;

            info!(url = %page_url, site = %site.name, "fetching page");
            let body = match client.fetch(&page_url, &options).await {
                Ok(body) => body,
                Err(source) => {
                    let err = EngineError::fetch(&page_url, source);
                    if flags.strict {
                        return Err(err);
                    }
                    error!(error = %err, "skipping page");
                    summary.pages_skipped += 1;
                    continue;
                }
            };

            summary.pages_fetched += 1;
            summary.pending_downloads +=
                extract_page(site, cache, ctx, &page_url, &origin, &body)?;
        }
    }

    info!(
        pages = summary.pages_fetched,
        skipped = summary.pages_skipped,
        assets = summary.pending_downloads,
        "extraction complete"
    );
    Ok(summary)
}

#[instrument(level = "debug", skip_all, fields(site = %site.name, url = %page_url))]
fn extract_page(
    site: &mut Site,
    cache: &RegexCache,
    ctx: &RunContext,
    page_url: &str,
    origin: &Url,
    body: &str,
) -> Result<usize, EngineError> {
    let subdirectory = resolve_subdirectory(site, cache, ctx, page_url, body)?;
    debug!(subdirectory = %subdirectory.display(), "resolved subdirectory");

    let mut added = 0;
    for asset in &mut site.assets {
        let pairs = asset_downloads(asset, cache, origin, &subdirectory, page_url, body)?;
        added += pairs.len();
        asset.downloads.extend(pairs);
    }

    let record = page_info(&site.infos, cache, page_url, body)?;
    site.info_map.insert(subdirectory, record);
    Ok(added)
}

/// `<location>/<site>` unless the site's subdirectory rule captures something.
///
/// An absolute capture is used verbatim, a relative one is joined under
/// `<location>/<site>`.
pub(crate) fn resolve_subdirectory(
    site: &Site,
    cache: &RegexCache,
    ctx: &RunContext,
    page_url: &str,
    body: &str,
) -> Result<PathBuf, EngineError> {
    let base = ctx.location.join(&site.name);
    let Some(rule) = &site.subdirectory else {
        return Ok(base);
    };

    let subject = match rule.source() {
        Some(CaptureSource::Url) => page_url,
        Some(CaptureSource::Body) => body,
        None => {
            return Err(EngineError::extraction(
                "Invalid subdirectory source",
                format!("site {:?}: {:?}", site.name, rule.from),
            ));
        }
    };

    let regex = matcher(cache, &rule.pattern)?;
    if !regex.is_match(subject) {
        debug!(pattern = %rule.pattern, "subdirectory pattern did not match");
        return Ok(base);
    }

    let captures = match capture::resolve(regex, false, &rule.capture, subject) {
        Ok(captures) => captures,
        Err(CaptureError::NoCaptures { .. }) => {
            debug!(pattern = %rule.pattern, "subdirectory group did not participate");
            return Ok(base);
        }
        Err(e) => {
            return Err(EngineError::extraction(
                "Failed to get subdirectory",
                format!("{page_url}: {e}"),
            ));
        }
    };
    Ok(captures.first().map_or(base.clone(), |dir| {
        let dir = Path::new(dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            base.join(dir)
        }
    }))
}

/// Source URL to destination path pairs produced by one asset on one page.
fn asset_downloads(
    asset: &Asset,
    cache: &RegexCache,
    origin: &Url,
    subdirectory: &Path,
    page_url: &str,
    body: &str,
) -> Result<BTreeMap<String, PathBuf>, EngineError> {
    let regex = matcher(cache, &asset.pattern)?;
    if !regex.is_match(body) {
        return Ok(BTreeMap::new());
    }

    let mut sources = capture::resolve(regex, asset.find_all, &asset.capture, body)
        .map_err(|e| capture_error(page_url, &e))?;
    let mut seen = HashSet::new();
    sources.retain(|src| seen.insert(src.clone()));

    if let Some(transform) = asset.transform(TransformKind::Url) {
        let regex = matcher(cache, &transform.pattern)?;
        for src in &mut sources {
            *src = regex
                .replace_all(src, transform.replace.as_str())
                .into_owned();
        }
    }

    let filename_transform = match asset.transform(TransformKind::Filename) {
        Some(transform) => Some((matcher(cache, &transform.pattern)?, transform)),
        None => None,
    };

    let mut pairs = BTreeMap::new();
    for src in sources {
        let file_name = match &filename_transform {
            Some((regex, transform)) => regex
                .replace_all(&src, transform.replace.as_str())
                .into_owned(),
            None => basename(&src).to_string(),
        };
        let file_path = Path::new(&file_name);
        let dest = if file_path.is_absolute() {
            file_path.to_path_buf()
        } else {
            subdirectory.join(file_path)
        };

        let dest = percent_decode(&dest)?;
        let source = resolve_source(origin, &src)?;
        pairs.insert(source, dest);
    }
    Ok(pairs)
}

/// The metadata record for one page: `url`, `timestamp`, and every info rule
/// that matched.
fn page_info(
    infos: &[Info],
    cache: &RegexCache,
    page_url: &str,
    body: &str,
) -> Result<InfoRecord, EngineError> {
    let mut record = InfoRecord::new();
    record.insert("url".to_string(), page_url.to_string());
    record.insert("timestamp".to_string(), capture_timestamp()?);

    for info in infos {
        let regex = matcher(cache, &info.pattern)?;
        if !regex.is_match(body) {
            continue;
        }
        let values = capture::resolve(regex, false, &info.capture, body)
            .map_err(|e| capture_error(page_url, &e))?;
        if let Some(value) = values.into_iter().next() {
            record.insert(info.name.clone(), value);
        }
    }
    Ok(record)
}

/// Scheme, host and port of `page_url`, with an empty path.
pub(crate) fn page_origin(page_url: &str) -> Result<Url, EngineError> {
    let mut origin = Url::parse(page_url).map_err(|e| {
        EngineError::extraction("Failed to parse url", format!("{page_url}: {e}"))
    })?;
    origin.set_path("");
    origin.set_query(None);
    origin.set_fragment(None);
    Ok(origin)
}

/// Absolute sources are kept as written; relative ones resolve against the
/// page origin.
pub(crate) fn resolve_source(origin: &Url, src: &str) -> Result<String, EngineError> {
    match Url::parse(src) {
        Ok(_) => Ok(src.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let resolved = origin.join(src).map_err(|e| {
                EngineError::extraction("Failed to resolve relative url", format!("{src}: {e}"))
            })?;
            debug!(src = %src, resolved = %resolved, "resolved relative url");
            Ok(resolved.into())
        }
        Err(e) => Err(EngineError::extraction(
            "Failed to parse url",
            format!("{src}: {e}"),
        )),
    }
}

/// Last non-empty path segment of a URL or path.
pub(crate) fn basename(src: &str) -> &str {
    let trimmed = src.trim_end_matches('/');
    match trimmed.rsplit('/').next() {
        Some(last) if !last.is_empty() => last,
        _ => src,
    }
}

/// Decodes `%XX` escapes. A `%` not followed by two hex digits is rejected.
fn percent_decode(path: &Path) -> Result<PathBuf, EngineError> {
    let text = path.to_string_lossy();
    if let Some(bad) = malformed_escape(&text) {
        return Err(EngineError::extraction(
            "Failed to unescape filename",
            format!("{text}: invalid escape {bad:?}"),
        ));
    }
    urlencoding::decode(&text)
        .map(|decoded| PathBuf::from(decoded.into_owned()))
        .map_err(|e| {
            EngineError::extraction("Failed to unescape filename", format!("{text}: {e}"))
        })
}

fn malformed_escape(text: &str) -> Option<&str> {
    text.match_indices('%').find_map(|(index, _)| {
        let escape = text.get(index..index + 3).unwrap_or(&text[index..]);
        let valid = escape.len() == 3 && escape.bytes().skip(1).all(|b| b.is_ascii_hexdigit());
        (!valid).then_some(escape)
    })
}

fn matcher<'c>(cache: &'c RegexCache, pattern: &str) -> Result<&'c Regex, EngineError> {
    cache.get(pattern).ok_or_else(|| {
        EngineError::extraction(
            "Missing compiled pattern",
            format!("{pattern:?} is not in the regex cache"),
        )
    })
}

fn capture_error(page_url: &str, err: &CaptureError) -> EngineError {
    EngineError::extraction("Failed to get captures", format!("{page_url}: {err}"))
}

fn capture_timestamp() -> Result<String, EngineError> {
    OffsetDateTime::now_utc().format(&Rfc3339).map_err(|e| {
        error!(error = %e, "could not format capture timestamp");
        EngineError::extraction("Failed to format timestamp", e.to_string())
    })
}
