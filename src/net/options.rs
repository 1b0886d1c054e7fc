//! Effective request options from the global/site/asset network blocks.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::{NetworkOverride, RootNetwork};

/// Timeout used when no level sets a positive one.
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

/// Attempt count used when no level sets a positive one.
pub const DEFAULT_RETRIES: u32 = 1;

/// Options applied to one fetch or download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub timeout: Duration,
    /// Total number of attempts.
    pub retries: u32,
    pub headers: BTreeMap<String, String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Accumulator::default().finish()
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    timeout: Option<i64>,
    retries: Option<i64>,
    headers: Option<BTreeMap<String, String>>,
}

impl Accumulator {
    fn apply(
        &mut self,
        timeout: Option<i64>,
        retries: Option<i64>,
        headers: Option<&BTreeMap<String, String>>,
    ) {
        if timeout.is_some() {
            self.timeout = timeout;
        }
        if retries.is_some() {
            self.retries = retries;
        }
        if let Some(headers) = headers {
            self.headers
                .get_or_insert_with(BTreeMap::new)
                .extend(headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }

    fn finish(self) -> FetchOptions {
        let timeout_ms = self
            .timeout
            .and_then(|ms| u64::try_from(ms).ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        let retries = self
            .retries
            .filter(|n| *n > 0)
            .map_or(DEFAULT_RETRIES, |n| u32::try_from(n).unwrap_or(u32::MAX));

        FetchOptions {
            timeout: Duration::from_millis(timeout_ms),
            retries,
            headers: self.headers.unwrap_or_default(),
        }
    }
}

/// Folds the root policy and the nested overrides, outermost first.
///
/// An override with `inherit = false` discards everything accumulated before
/// it. Scalars overwrite, headers merge by key with the inner level winning.
/// Non-positive timeouts and retry counts fall back to the defaults.
#[must_use]
pub fn merge(root: Option<&RootNetwork>, chain: &[Option<&NetworkOverride>]) -> FetchOptions {
    let mut acc = Accumulator::default();
    if let Some(root) = root {
        acc.apply(root.timeout, root.retries, root.headers.as_ref());
    }
    for level in chain.iter().flatten() {
        if level.inherit == Some(false) {
            acc = Accumulator::default();
        }
        acc.apply(level.timeout, level.retries, level.headers.as_ref());
    }
    acc.finish()
}
