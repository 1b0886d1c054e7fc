//! Assigns input URLs to sites.

use tracing::{debug, trace};

use crate::config::{RegexCache, Site};

/// Appends each URL to the first site whose `test` pattern finds a match in
/// it, in declaration order.
///
/// URLs no site claims are dropped. A site's list never holds the same URL
/// twice. Returns the number of URLs that were routed.
pub fn route(urls: &[String], sites: &mut [Site], cache: &RegexCache) -> usize {
    let mut routed = 0;
    for url in urls {
        let claimed = sites.iter_mut().find(|site| {
            cache
                .get(&site.test)
                .is_some_and(|regex| regex.is_match(url))
        });
        match claimed {
            Some(site) => {
                trace!(url = %url, site = %site.name, "url routed");
                if !site.urls.contains(url) {
                    site.urls.push(url.clone());
                }
                routed += 1;
            }
            None => debug!(url = %url, "no site matches url"),
        }
    }
    routed
}
