//! URL normalisation and URL list files.

use std::path::Path;

use tracing::trace;
use url::Url;

use super::error::ArgumentError;

/// Prefixes that mark a comment line in a URL list.
const COMMENT_PREFIXES: [&str; 3] = ["#", "//", ";"];

/// Parses `raw` as an absolute URL and drops its fragment.
///
/// Returns `None` when `raw` is not an absolute URL.
#[must_use]
pub fn normalize_url(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    url.set_fragment(None);
    Some(url.into())
}

/// Reads one URL per line.
///
/// Blank lines and lines starting with `#`, `//` or `;` are ignored. CRLF line
/// endings are accepted.
///
/// # Errors
///
/// Returns [`ArgumentError::InvalidUrl`] for the first line that is not an
/// absolute URL. `file` only labels the error.
pub fn parse_url_list(contents: &str, file: &Path) -> Result<Vec<String>, ArgumentError> {
    let mut urls = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || COMMENT_PREFIXES.iter().any(|p| line.starts_with(p)) {
            continue;
        }
        let url = normalize_url(line).ok_or_else(|| ArgumentError::InvalidUrl {
            value: line.to_string(),
            file: file.to_path_buf(),
            line: index + 1,
        })?;
        trace!(url = %url, line = index + 1, "url from list");
        urls.push(url);
    }
    Ok(urls)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_fragment() {
        assert_eq!(
            normalize_url("https://example.com/a/b?x=1#top").unwrap(),
            "https://example.com/a/b?x=1"
        );
    }

    #[test]
    fn test_normalize_rejects_relative() {
        assert!(normalize_url("/gallery/1").is_none());
        assert!(normalize_url("example.com").is_none());
    }

    #[test]
    fn test_list_skips_comments_and_blank_lines() {
        let contents = "# gallery list\r\n\r\nhttps://a.com/1\r\n// old\n; skip\n  https://b.com/2#frag  \n";
        let urls = parse_url_list(contents, Path::new("urls.txt")).unwrap();
        assert_eq!(urls, vec!["https://a.com/1", "https://b.com/2"]);
    }

    #[test]
    fn test_list_invalid_line_reports_position() {
        let contents = "https://a.com/1\n\nnot a url\n";
        let err = parse_url_list(contents, Path::new("urls.txt")).unwrap_err();
        match &err {
            ArgumentError::InvalidUrl { value, line, .. } => {
                assert_eq!(value, "not a url");
                assert_eq!(*line, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.diagnostic().subject.as_deref(), Some("urls.txt:3"));
    }
}
