//! Turns `grab get` arguments into the list of page URLs to visit.
//!
//! Each argument is either an existing file holding a URL list or an
//! absolute URL. Duplicates are removed, keeping first occurrences.

mod error;
mod url;

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, trace};

pub use error::ArgumentError;
pub use url::{normalize_url, parse_url_list};

/// Resolves arguments into unique absolute URLs, in argument order.
///
/// Relative file paths are resolved against `working_dir`.
///
/// # Errors
///
/// Returns the first [`ArgumentError`]: an argument that is neither a file nor
/// a URL, an unreadable file, or an invalid line in a URL list.
pub fn urls_from_args<S: AsRef<str>>(
    args: &[S],
    working_dir: &Path,
) -> Result<Vec<String>, ArgumentError> {
    let mut seen_args = HashSet::new();
    let mut urls = Vec::new();

    for arg in args.iter().map(AsRef::as_ref) {
        if !seen_args.insert(arg) {
            continue;
        }

        let path = working_dir.join(arg);
        if path.is_file() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|source| ArgumentError::Read {
                    path: path.clone(),
                    source,
                })?;
            let listed = parse_url_list(&contents, &path)?;
            debug!(path = %path.display(), urls = listed.len(), "read url list");
            urls.extend(listed);
        } else {
            let url = normalize_url(arg).ok_or_else(|| ArgumentError::InvalidArgument {
                arg: arg.to_string(),
            })?;
            trace!(url = %url, "url from argument");
            urls.push(url);
        }
    }

    let mut seen = HashSet::new();
    urls.retain(|url| seen.insert(url.clone()));
    Ok(urls)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_urls_and_files_are_combined_in_order() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("list.txt"),
            "https://b.com/1\nhttps://a.com/1\n",
        )
        .unwrap();

        let urls = urls_from_args(
            &["https://a.com/1", "list.txt", "https://c.com/1#x"],
            temp_dir.path(),
        )
        .unwrap();
        assert_eq!(
            urls,
            vec!["https://a.com/1", "https://b.com/1", "https://c.com/1"]
        );
    }

    #[test]
    fn test_duplicate_arguments_are_read_once() {
        let temp_dir = TempDir::new().unwrap();
        let urls = urls_from_args(
            &["https://a.com/1", "https://a.com/1#frag", "https://a.com/1"],
            temp_dir.path(),
        )
        .unwrap();
        assert_eq!(urls, vec!["https://a.com/1"]);
    }

    #[test]
    fn test_argument_neither_file_nor_url() {
        let temp_dir = TempDir::new().unwrap();
        let err = urls_from_args(&["missing.txt"], temp_dir.path()).unwrap_err();
        assert!(matches!(err, ArgumentError::InvalidArgument { .. }));
        assert_eq!(err.diagnostic().summary, "Invalid argument");
    }

    #[test]
    fn test_absolute_file_path() {
        let temp_dir = TempDir::new().unwrap();
        let list = temp_dir.path().join("urls.txt");
        std::fs::write(&list, "https://x.com/\n").unwrap();

        let urls = urls_from_args(&[list.to_string_lossy()], Path::new("/")).unwrap();
        assert_eq!(urls, vec!["https://x.com/"]);
    }
}
