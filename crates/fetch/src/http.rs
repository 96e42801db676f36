//! Fetching over HTTP with [`reqwest`].

use async_trait::async_trait;
use exn::ResultExt;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Error as ReqwestError};
use std::time::Duration;
use tracing::instrument;
use url::Url;

use crate::Fetcher;
use crate::error::{ErrorKind, Result};

/// The vendor page listing every WinBox build.
pub const DEFAULT_SOURCE_URL: &str = "https://mikrotik.com/download/winbox";
/// Upper bound for one fetch attempt, connection and body included.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
/// The vendor serves different (or no) content to clients that don't look
/// like a desktop browser.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0 Safari/537.36";
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Fetches the download page with a shared [`reqwest::Client`].
///
/// Cloning is cheap; clones share the client's connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    source: Url,
    timeout: Duration,
}
impl HttpFetcher {
    /// Create a fetcher for the given page.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidSource`] if `source` isn't an `http`/`https`
    /// URL, or [`ErrorKind::Client`] if the TLS backend fails to initialise.
    pub fn new(source: impl AsRef<str>) -> Result<Self> {
        Self::with_timeout(source, FETCH_TIMEOUT)
    }

    /// Like [`new`](Self::new), but bounding each attempt by `timeout`
    /// instead of [`FETCH_TIMEOUT`].
    pub fn with_timeout(source: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let raw = source.as_ref().trim();
        let source = Url::parse(raw).or_raise(|| ErrorKind::InvalidSource(raw.to_string()))?;
        if !matches!(source.scheme(), "http" | "https") {
            exn::bail!(ErrorKind::InvalidSource(raw.to_string()));
        }
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE));
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .or_raise(|| ErrorKind::Client)?;
        Ok(Self { client, source, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn classify(error: &ReqwestError, otherwise: ErrorKind) -> ErrorKind {
        if error.is_timeout() { ErrorKind::Timeout } else { otherwise }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn source(&self) -> &Url {
        &self.source
    }

    #[instrument(skip(self), fields(source = %self.source, status = tracing::field::Empty))]
    async fn fetch(&self) -> Result<String> {
        let response = match self.client.get(self.source.clone()).send().await {
            Ok(response) => response,
            Err(error) => {
                let kind = Self::classify(&error, ErrorKind::Request);
                return Err(error).or_raise(|| kind);
            },
        };
        let status = response.status();
        tracing::Span::current().record("status", status.as_u16());
        if !status.is_success() {
            exn::bail!(ErrorKind::Status(status.as_u16()));
        }
        match response.text().await {
            Ok(body) => {
                tracing::debug!(bytes = body.len(), "fetched download page");
                Ok(body)
            },
            Err(error) => {
                let kind = Self::classify(&error, ErrorKind::Body);
                Err(error).or_raise(|| kind)
            },
        }
    }
}
