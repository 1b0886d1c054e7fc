//! HTTP access for page fetches and asset downloads.
//!
//! - [`options`] folds the global/site/asset network blocks into [`FetchOptions`]
//! - [`client`] performs requests with those options

mod client;
mod error;
mod options;

pub use client::HttpClient;
pub use error::FetchError;
pub use options::{DEFAULT_RETRIES, DEFAULT_TIMEOUT_MS, FetchOptions, merge};
