use exn::OptionExt;
use tracing::instrument;
use winboxget_extract::models::ResourceKey;
use winboxget_fetch::FetcherHandle;

use crate::cache::ResourceCache;
use crate::error::{ErrorKind, Result};

/// Answers "what is the current download URL for this build?".
///
/// This is the only type request handlers talk to. It owns the
/// [`ResourceCache`] and the [`Fetcher`](winboxget_fetch::Fetcher) that
/// refreshes it.
pub struct Resolver {
    cache: ResourceCache,
    fetcher: FetcherHandle,
    serve_stale: bool,
}
impl Resolver {
    /// Create a resolver with an empty cache, serving stale links when a
    /// refresh fails.
    pub fn new(fetcher: FetcherHandle) -> Self {
        Self {
            cache: ResourceCache::new(),
            fetcher,
            serve_stale: true,
        }
    }

    pub fn with_cache(mut self, cache: ResourceCache) -> Self {
        self.cache = cache;
        self
    }

    /// Whether a previously known link may be returned when refreshing fails.
    pub fn serve_stale(mut self, enabled: bool) -> Self {
        self.serve_stale = enabled;
        self
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    /// Returns the current download URL for `key`, refreshing the cache first
    /// if its freshness window has elapsed.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::ResolveFailed`] if a refresh was needed and failed (its
    ///   cause is attached as a child), unless stale links may be served and
    ///   one is known for `key`.
    /// - [`ErrorKind::KeyNotAvailable`] if the download page was read but
    ///   doesn't list `key`.
    #[instrument(skip(self))]
    pub async fn resolve(&self, key: ResourceKey) -> Result<String> {
        if let Some(url) = self.cache.lookup_fresh(key).await {
            return Ok(url);
        }
        if let Err(err) = self.cache.ensure_fresh(self.fetcher.as_ref()).await {
            if self.serve_stale
                && let Some(url) = self.cache.lookup(key).await
            {
                let cause: &ErrorKind = &err;
                tracing::warn!(error = %cause, %url, "refresh failed; serving stale download link");
                return Ok(url);
            }
            return Err(err.raise(ErrorKind::ResolveFailed));
        }
        self.cache.lookup(key).await.ok_or_raise(|| ErrorKind::KeyNotAvailable(key))
    }

    /// Refresh the cache if needed, logging (not returning) any failure.
    ///
    /// Used where stale or missing links are acceptable, such as rendering
    /// the index page.
    pub async fn prime(&self) {
        if let Err(err) = self.cache.ensure_fresh(self.fetcher.as_ref()).await {
            let cause: &ErrorKind = &err;
            tracing::warn!(error = %cause, "could not refresh download links");
        }
    }
}
