//! HTTP client shared by page fetches and asset downloads.
//!
//! Both operations go through the same attempt loop: up to
//! [`FetchOptions::retries`] attempts, no delay between them, stopping at the
//! first 2xx response. When every attempt fails the last failure is returned.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, ClientBuilder, Response};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::error::FetchError;
use super::options::FetchOptions;
use crate::user_agent;

/// Connect timeout applied to every request; the overall timeout comes from
/// [`FetchOptions`].
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// HTTP client for page fetches and streaming downloads.
///
/// Create it once per run and reuse it so connections are pooled.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client with gzip support and the tool's User-Agent.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, FetchError> {
        let client = base_client_builder().build().map_err(FetchError::client)?;
        Ok(Self { client })
    }

    /// Fetches `url` and returns the response body as text.
    ///
    /// # Errors
    ///
    /// Returns the last attempt's error when every attempt failed, or a
    /// network error if the body cannot be read.
    #[instrument(skip(self, options), fields(url = %url))]
    pub async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String, FetchError> {
        let response = self.send_with_retries(url, options).await?;
        let body = response.text().await.map_err(|e| map_send_error(url, e))?;
        debug!(bytes = body.len(), "page fetched");
        Ok(body)
    }

    /// Downloads `url` into `dest`, replacing any existing file.
    ///
    /// A partially written file is removed when the body stream fails.
    ///
    /// # Errors
    ///
    /// Returns the last attempt's error when every attempt failed, or an IO
    /// or network error raised while streaming the body.
    #[instrument(skip(self, options), fields(url = %url, dest = %dest.display()))]
    pub async fn download(
        &self,
        url: &str,
        dest: &Path,
        options: &FetchOptions,
    ) -> Result<u64, FetchError> {
        let response = self.send_with_retries(url, options).await?;

        let mut file = File::create(dest)
            .await
            .map_err(|e| FetchError::io(dest, e))?;
        let stream_result = stream_to_file(&mut file, response, url, dest).await;
        if stream_result.is_err() {
            debug!(path = %dest.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(dest).await;
        }
        let bytes = stream_result?;

        info!(path = %dest.display(), bytes, "download complete");
        Ok(bytes)
    }

    async fn send_with_retries(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<Response, FetchError> {
        let attempts = options.retries.max(1);
        let mut attempt = 1;
        loop {
            match self.send_request(url, options).await {
                Ok(response) => return Ok(response),
                Err(error) if attempt < attempts => {
                    debug!(attempt, attempts, error = %error, "request failed, retrying");
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn send_request(&self, url: &str, options: &FetchOptions) -> Result<Response, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;

        let mut request = self.client.get(parsed).timeout(options.timeout);
        for (name, value) in &options.headers {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|e| map_send_error(url, e))?;
        if !response.status().is_success() {
            return Err(FetchError::http_status(url, response.status().as_u16()));
        }
        Ok(response)
    }
}

fn map_send_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::timeout(url)
    } else {
        FetchError::network(url, error)
    }
}

/// Streams the response body into `file`, returning the number of bytes written.
async fn stream_to_file(
    file: &mut File,
    response: Response,
    url: &str,
    path: &Path,
) -> Result<u64, FetchError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| map_send_error(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| FetchError::io(path, e))?;
        written += chunk.len() as u64;
    }

    writer.flush().await.map_err(|e| FetchError::io(path, e))?;
    Ok(written)
}

fn base_client_builder() -> ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .gzip(true)
        .user_agent(user_agent::default_user_agent())
}
