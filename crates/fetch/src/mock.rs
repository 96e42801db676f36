//! In-memory fetcher for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

use crate::error::{ErrorKind, Result};
use crate::{DEFAULT_SOURCE_URL, Fetcher};

enum Response {
    Page(String),
    Failure(ErrorKind),
}

/// In-memory fetcher for testing.
///
/// Serves a scripted page (or failure) behind a [`RwLock`], so the response
/// can be swapped between calls while other tasks hold a shared reference.
/// Every call to [`fetch`](Fetcher::fetch) is counted, and an optional
/// latency keeps the "request" in flight long enough for concurrency tests.
///
/// # Examples
///
/// ```
/// use winboxget_fetch::{Fetcher, MockFetcher};
/// use winboxget_fetch::error::ErrorKind;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let fetcher = MockFetcher::with_page("<a href=\"winbox.exe\">WinBox</a>");
/// assert!(fetcher.fetch().await.is_ok());
///
/// fetcher.set_failure(ErrorKind::Timeout).await;
/// assert!(fetcher.fetch().await.is_err());
/// assert_eq!(fetcher.calls(), 2);
/// # }
/// ```
pub struct MockFetcher {
    source: Url,
    response: RwLock<Response>,
    latency: Duration,
    calls: AtomicUsize,
}

impl MockFetcher {
    fn new(response: Response) -> Self {
        Self {
            // The panic here is DELIBERATE: the constant is a valid URL, and
            // MockFetcher only exists for tests.
            source: Url::parse(DEFAULT_SOURCE_URL).expect("default source URL is valid"),
            response: RwLock::new(response),
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a fetcher that returns `html` on every call.
    pub fn with_page(html: impl Into<String>) -> Self {
        Self::new(Response::Page(html.into()))
    }

    /// Create a fetcher that fails with `kind` on every call.
    pub fn failing(kind: ErrorKind) -> Self {
        Self::new(Response::Failure(kind))
    }

    /// Delay every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Serve `html` from now on.
    pub async fn set_page(&self, html: impl Into<String>) {
        *self.response.write().await = Response::Page(html.into());
    }

    /// Fail with `kind` from now on.
    pub async fn set_failure(&self, kind: ErrorKind) {
        *self.response.write().await = Response::Failure(kind);
    }

    /// Number of times [`fetch`](Fetcher::fetch) has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    fn source(&self) -> &Url {
        &self.source
    }

    async fn fetch(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match &*self.response.read().await {
            Response::Page(html) => Ok(html.clone()),
            Response::Failure(kind) => exn::bail!(kind.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_page_and_counts() {
        let fetcher = MockFetcher::with_page("<html></html>");
        assert_eq!(fetcher.fetch().await.unwrap(), "<html></html>");
        assert_eq!(fetcher.fetch().await.unwrap(), "<html></html>");
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_switches_between_failure_and_page() {
        let fetcher = MockFetcher::failing(ErrorKind::Timeout);
        let err = fetcher.fetch().await.unwrap_err();
        assert_eq!(&*err, &ErrorKind::Timeout);

        fetcher.set_page("ok").await;
        assert_eq!(fetcher.fetch().await.unwrap(), "ok");
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency() {
        let fetcher = MockFetcher::with_page("slow").with_latency(Duration::from_secs(5));
        let started = tokio::time::Instant::now();
        fetcher.fetch().await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
