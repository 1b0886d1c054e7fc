//! Typed configuration model.
//!
//! Decoded values are plain owned data. `Site::urls`, `Site::info_map` and
//! `Asset::downloads` start empty and are filled in by the extraction pass.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A metadata record written to `_info.json`.
pub type InfoRecord = BTreeMap<String, String>;

/// Root of a decoded `grab.hcl`.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub global: Global,
    pub sites: Vec<Site>,
}

/// The `global` block.
#[derive(Debug, Clone, PartialEq)]
pub struct Global {
    /// Destination root as written in the file (may start with `~` or be relative).
    pub location: String,
    pub network: Option<RootNetwork>,
}

/// Network policy declared in the `global` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootNetwork {
    /// Request timeout in milliseconds.
    pub timeout: Option<i64>,
    pub retries: Option<i64>,
    pub headers: Option<BTreeMap<String, String>>,
}

/// Network policy declared below the root (site or asset level).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkOverride {
    /// `Some(false)` drops everything inherited from outer levels.
    pub inherit: Option<bool>,
    pub timeout: Option<i64>,
    pub retries: Option<i64>,
    pub headers: Option<BTreeMap<String, String>>,
}

/// A `site "<name>"` block.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub name: String,
    pub test: String,
    pub network: Option<NetworkOverride>,
    pub subdirectory: Option<Subdirectory>,
    pub assets: Vec<Asset>,
    pub infos: Vec<Info>,

    /// Input URLs routed to this site, unique and in supplied order.
    pub urls: Vec<String>,
    /// Resolved subdirectory to the metadata captured for it.
    pub info_map: BTreeMap<PathBuf, InfoRecord>,
}

impl Site {
    /// Total number of pending downloads across all assets.
    #[must_use]
    pub fn pending_downloads(&self) -> usize {
        self.assets.iter().map(|a| a.downloads.len()).sum()
    }
}

/// An `asset "<name>"` block.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub name: String,
    pub pattern: String,
    /// Capture selector text, either a group index or a group name.
    pub capture: String,
    pub find_all: bool,
    pub network: Option<NetworkOverride>,
    pub transforms: Vec<Transform>,

    /// Absolute source URL to destination path.
    pub downloads: BTreeMap<String, PathBuf>,
}

impl Asset {
    /// Returns the transform with the given label, if declared.
    #[must_use]
    pub fn transform(&self, kind: TransformKind) -> Option<&Transform> {
        self.transforms.iter().find(|t| t.label == kind.as_str())
    }
}

/// An `info "<name>"` block.
#[derive(Debug, Clone, PartialEq)]
pub struct Info {
    pub name: String,
    pub pattern: String,
    pub capture: String,
}

/// The `subdirectory` block of a site.
#[derive(Debug, Clone, PartialEq)]
pub struct Subdirectory {
    pub pattern: String,
    pub capture: String,
    /// Raw `from` value; see [`Subdirectory::source`].
    pub from: String,
}

impl Subdirectory {
    /// The text the pattern runs against, or `None` for an unknown `from`.
    #[must_use]
    pub fn source(&self) -> Option<CaptureSource> {
        match self.from.as_str() {
            "body" => Some(CaptureSource::Body),
            "url" => Some(CaptureSource::Url),
            _ => None,
        }
    }
}

/// Input of a subdirectory rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSource {
    Body,
    Url,
}

/// A `transform "<label>"` block.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub label: String,
    pub pattern: String,
    pub replace: String,
}

/// The closed set of transform labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    /// Rewrites the source URL.
    Url,
    /// Derives the destination file name.
    Filename,
}

impl TransformKind {
    pub const ALL: [Self; 2] = [Self::Url, Self::Filename];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Filename => "filename",
        }
    }

    /// Parses a block label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == label)
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn asset_with(labels: &[&str]) -> Asset {
        Asset {
            name: "image".to_string(),
            pattern: "x".to_string(),
            capture: "0".to_string(),
            find_all: false,
            network: None,
            transforms: labels
                .iter()
                .map(|label| Transform {
                    label: (*label).to_string(),
                    pattern: (*label).to_string(),
                    replace: String::new(),
                })
                .collect(),
            downloads: BTreeMap::new(),
        }
    }

    #[test]
    fn test_transform_lookup_by_kind() {
        let asset = asset_with(&["filename"]);
        assert!(asset.transform(TransformKind::Url).is_none());
        assert_eq!(
            asset.transform(TransformKind::Filename).unwrap().pattern,
            "filename"
        );
    }

    #[test]
    fn test_transform_kind_from_label() {
        assert_eq!(TransformKind::from_label("url"), Some(TransformKind::Url));
        assert_eq!(
            TransformKind::from_label("filename"),
            Some(TransformKind::Filename)
        );
        assert_eq!(TransformKind::from_label("path"), None);
    }

    #[test]
    fn test_subdirectory_source() {
        let mut sub = Subdirectory {
            pattern: "x".to_string(),
            capture: "1".to_string(),
            from: "url".to_string(),
        };
        assert_eq!(sub.source(), Some(CaptureSource::Url));
        sub.from = "body".to_string();
        assert_eq!(sub.source(), Some(CaptureSource::Body));
        sub.from = "header".to_string();
        assert_eq!(sub.source(), None);
    }
}
