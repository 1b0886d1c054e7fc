//! Dry-run report.

use std::path::Path;

use crate::config::Config;

/// Renders what a real run would write, for sites with pending downloads.
///
/// ```text
/// site: example
/// info: /media/example/123:
///       title : Grab Test Server
///         url : http://127.0.0.1:8080/gallery/123/test
/// asset "image": 2 assets
/// http://127.0.0.1:8080/img/a.jpg → example/123/a.jpg
/// http://127.0.0.1:8080/img/b.jpg → example/123/b.jpg
/// ```
///
/// Rows are sorted by key. Destinations are shown relative to `location`.
#[must_use]
pub fn dry_run_report(config: &Config, location: &Path) -> String {
    let mut out = String::new();
    for site in config.sites.iter().filter(|site| site.pending_downloads() > 0) {
        out.push_str(&format!("site: {}\n", site.name));

        for (subdirectory, record) in &site.info_map {
            out.push_str(&format!("info: {}:\n", subdirectory.display()));
            out.push_str(&format_table(
                record.iter().map(|(k, v)| (k.as_str(), v.clone())),
                " : ",
                true,
            ));
        }

        for asset in &site.assets {
            out.push_str(&format!(
                "asset {:?}: {}\n",
                asset.name,
                plural(asset.downloads.len(), "asset", "assets")
            ));
            out.push_str(&format_table(
                asset.downloads.iter().map(|(src, dest)| {
                    let shown = dest.strip_prefix(location).unwrap_or(dest.as_path());
                    (src.as_str(), shown.display().to_string())
                }),
                " → ",
                false,
            ));
        }
    }
    out
}

/// One `key<sep>value` row per entry with keys padded to a common width.
fn format_table<'a>(
    rows: impl IntoIterator<Item = (&'a str, String)>,
    separator: &str,
    align_right: bool,
) -> String {
    let rows: Vec<(&str, String)> = rows.into_iter().collect();
    let width = rows
        .iter()
        .map(|(key, _)| key.chars().count())
        .max()
        .unwrap_or(0);

    rows.iter()
        .map(|(key, value)| {
            if align_right {
                format!("{key:>width$}{separator}{value}\n")
            } else {
                format!("{key:<width$}{separator}{value}\n")
            }
        })
        .collect()
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}
