//! User-Agent sent with every request.

/// Project URL advertised in the User-Agent.
const PROJECT_UA_URL: &str = "https://github.com/everdrone/grab";

/// Default User-Agent (`grab/<version> (+<project url>)`).
///
/// A `User-Agent` entry in a `network.headers` block replaces it.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("grab/{version} (+{PROJECT_UA_URL})")
}
