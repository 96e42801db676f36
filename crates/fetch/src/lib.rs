//! The single outbound request of the service: downloading the vendor's
//! WinBox download page.
//!
//! [`Fetcher`] is the seam the cache is built against; [`HttpFetcher`] is the
//! real implementation. Enable the `mock` feature for an in-memory
//! [`MockFetcher`] in tests.

pub mod error;
mod http;
#[cfg(feature = "mock")]
mod mock;

use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

use crate::error::Result;
pub use crate::http::{ACCEPT_LANGUAGE, DEFAULT_SOURCE_URL, FETCH_TIMEOUT, HttpFetcher, USER_AGENT};
#[cfg(feature = "mock")]
pub use crate::mock::MockFetcher;

pub type FetcherHandle = Arc<dyn Fetcher>;

/// Retrieves the raw HTML of the download page.
///
/// Implementations perform exactly one attempt per call; there is no retry at
/// this layer. The whole body is read before returning.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// The page being fetched. Relative links found on it are resolved
    /// against this URL.
    fn source(&self) -> &Url;

    /// Fetch the page, returning its body as text.
    async fn fetch(&self) -> Result<String>;
}
