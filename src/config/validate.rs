//! Business rules that the block schema cannot express.
//!
//! Each rule runs over every site before the next rule starts, and the first
//! violation is returned.

use std::collections::HashSet;

use super::error::ConfigError;
use super::model::{Config, TransformKind};

/// Runs all rules in order.
pub(crate) fn validate(config: &Config) -> Result<(), ConfigError> {
    check_site_contents(config)?;
    check_transform_labels(config)?;
    check_subdirectory_sources(config)
}

/// Every site declares at least one asset or one info block.
fn check_site_contents(config: &Config) -> Result<(), ConfigError> {
    for site in &config.sites {
        if site.assets.is_empty() && site.infos.is_empty() {
            return Err(ConfigError::invalid(
                "Insufficient asset or info blocks",
                "At least one asset or one info block must be defined inside a \"site\" block.",
                format!("site {:?}", site.name),
            ));
        }
    }
    Ok(())
}

/// Transform labels come from the closed set and appear once per asset.
fn check_transform_labels(config: &Config) -> Result<(), ConfigError> {
    for site in &config.sites {
        for asset in &site.assets {
            let mut seen = HashSet::new();
            for transform in &asset.transforms {
                let subject = format!(
                    "site {:?}.asset {:?}.transform {:?}",
                    site.name, asset.name, transform.label
                );
                if TransformKind::from_label(&transform.label).is_none() {
                    return Err(ConfigError::invalid(
                        "Invalid block label",
                        format!(
                            "The label of a \"transform\" block must be either \"{}\" or \"{}\", got {:?}.",
                            TransformKind::Url,
                            TransformKind::Filename,
                            transform.label
                        ),
                        subject,
                    ));
                }
                if !seen.insert(transform.label.as_str()) {
                    return Err(ConfigError::invalid(
                        "Duplicate block label",
                        format!(
                            "A \"transform\" block labeled {:?} is already defined for this asset.",
                            transform.label
                        ),
                        subject,
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Subdirectory rules read from either the page body or the page URL.
fn check_subdirectory_sources(config: &Config) -> Result<(), ConfigError> {
    for site in &config.sites {
        if let Some(sub) = &site.subdirectory
            && sub.source().is_none()
        {
            return Err(ConfigError::invalid(
                "Invalid block attribute",
                format!(
                    "The \"from\" attribute must be either \"body\" or \"url\", got {:?}.",
                    sub.from
                ),
                format!("site {:?}.subdirectory.from", site.name),
            ));
        }
    }
    Ok(())
}
