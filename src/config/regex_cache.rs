//! Compiled matchers keyed by pattern literal.

use std::collections::HashMap;

use regex::Regex;
use tracing::trace;

use super::error::ConfigError;
use super::model::Config;

/// One compiled [`Regex`] per distinct pattern literal in a configuration.
///
/// Built once after validation and shared by reference with the extraction
/// pass.
#[derive(Debug, Default)]
pub struct RegexCache {
    patterns: HashMap<String, Regex>,
}

impl RegexCache {
    /// Compiles every pattern literal of `config`.
    ///
    /// Walks each site's `test`, each asset's `pattern` and its transforms'
    /// `pattern`, each info `pattern`, then the subdirectory `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Regex`] for the first literal that fails to
    /// compile.
    pub fn build(config: &Config) -> Result<Self, ConfigError> {
        let mut cache = Self::default();
        for site in &config.sites {
            let site_path = format!("site {:?}", site.name);
            cache.insert(&site.test, || format!("{site_path}.test"))?;

            for asset in &site.assets {
                let asset_path = format!("{site_path}.asset {:?}", asset.name);
                cache.insert(&asset.pattern, || format!("{asset_path}.pattern"))?;
                for transform in &asset.transforms {
                    cache.insert(&transform.pattern, || {
                        format!("{asset_path}.transform {:?}.pattern", transform.label)
                    })?;
                }
            }

            for info in &site.infos {
                cache.insert(&info.pattern, || {
                    format!("{site_path}.info {:?}.pattern", info.name)
                })?;
            }

            if let Some(sub) = &site.subdirectory {
                cache.insert(&sub.pattern, || format!("{site_path}.subdirectory.pattern"))?;
            }
        }
        trace!(patterns = cache.len(), "compiled regex cache");
        Ok(cache)
    }

    fn insert(
        &mut self,
        pattern: &str,
        subject: impl FnOnce() -> String,
    ) -> Result<(), ConfigError> {
        if self.patterns.contains_key(pattern) {
            return Ok(());
        }
        let regex = Regex::new(pattern).map_err(|e| ConfigError::regex(pattern, subject(), e))?;
        self.patterns.insert(pattern.to_string(), regex);
        Ok(())
    }

    /// Returns the matcher compiled for `pattern`.
    #[must_use]
    pub fn get(&self, pattern: &str) -> Option<&Regex> {
        self.patterns.get(pattern)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Iterates over the cached pattern literals in no particular order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }
}
