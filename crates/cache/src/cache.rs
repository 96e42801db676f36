//! The shared, time-bounded map of download links.

use exn::ResultExt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::instrument;
use winboxget_extract::Extractor;
use winboxget_extract::models::{ResourceKey, ResourceMap};
use winboxget_fetch::Fetcher;
use winboxget_fetch::error::ErrorKind as FetchErrorKind;

use crate::error::{ErrorKind, Result};

/// How long a successful refresh is trusted before the page is fetched again.
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Default)]
struct State {
    entries: ResourceMap,
    /// One expiry for the whole map; `None` until the first refresh.
    expires_at: Option<Instant>,
}
impl State {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now >= at)
    }
}

/// Last-known download links plus the time they stop being trusted.
///
/// Every read and write of the map and its expiry happens under one lock,
/// held only for that critical section. Fetching and parsing happen with
/// the lock released, so one slow upstream request never serialises the
/// readers behind it.
#[derive(Debug)]
pub struct ResourceCache {
    state: Mutex<State>,
    window: Duration,
}
impl Default for ResourceCache {
    fn default() -> Self {
        Self::new()
    }
}
impl ResourceCache {
    /// Create an empty cache using the standard [`FRESHNESS_WINDOW`].
    pub fn new() -> Self {
        Self::with_window(FRESHNESS_WINDOW)
    }

    /// Create an empty cache that trusts each refresh for `window`.
    pub fn with_window(window: Duration) -> Self {
        Self {
            state: Mutex::new(State::default()),
            window,
        }
    }

    /// Current value for `key`, however old. Never touches the network.
    pub async fn lookup(&self, key: ResourceKey) -> Option<String> {
        self.state.lock().await.entries.get(key).map(str::to_string)
    }

    /// Current value for `key`, only if the freshness window hasn't elapsed.
    pub async fn lookup_fresh(&self, key: ResourceKey) -> Option<String> {
        let state = self.state.lock().await;
        if state.is_expired(Instant::now()) {
            return None;
        }
        state.entries.get(key).map(str::to_string)
    }

    /// Copy of every known link.
    pub async fn snapshot(&self) -> ResourceMap {
        self.state.lock().await.entries.clone()
    }

    /// When the current contents stop being trusted (`None` before the first
    /// successful refresh).
    pub async fn expires_at(&self) -> Option<Instant> {
        self.state.lock().await.expires_at
    }

    /// Returns `true` if the next [`ensure_fresh`](Self::ensure_fresh) will
    /// go upstream: the window has elapsed, or nothing has been found yet.
    pub async fn needs_refresh(&self) -> bool {
        let state = self.state.lock().await;
        state.is_expired(Instant::now()) || state.entries.is_empty()
    }

    /// Refresh the cache from `fetcher` unless it is still fresh.
    ///
    /// A successful refresh merges whatever links were found (possibly none)
    /// and restarts the freshness window. A failed refresh leaves both the
    /// map and its expiry untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::FetchFailed`] if the page could not be retrieved,
    /// or [`ErrorKind::ParseFailed`] if its body could not be read.
    #[instrument(skip_all, fields(source = %fetcher.source()))]
    pub async fn ensure_fresh(&self, fetcher: &dyn Fetcher) -> Result<()> {
        if !self.needs_refresh().await {
            tracing::trace!("download links still fresh");
            return Ok(());
        }
        let scraped = Self::scrape(fetcher).await?;
        self.merge(scraped).await;
        Ok(())
    }

    /// Fetch and parse the page. Runs without the lock.
    async fn scrape(fetcher: &dyn Fetcher) -> Result<ResourceMap> {
        let html = match fetcher.fetch().await {
            Ok(html) => html,
            Err(err) => {
                let kind = match &*err {
                    FetchErrorKind::Body => ErrorKind::ParseFailed,
                    _ => ErrorKind::FetchFailed,
                };
                return Err(err).or_raise(|| kind);
            },
        };
        let base = fetcher.source().clone();
        // `scraper::Html` isn't `Send`; build and drop it on the blocking pool
        // so only the finished map crosses back.
        tokio::task::spawn_blocking(move || Extractor::from_html(&html).with_base(base).resources())
            .await
            .or_raise(|| ErrorKind::ParseFailed)
    }

    /// Merge a fresh scrape and restart the freshness window.
    ///
    /// The expiry never moves backwards, even when an older refresh finishes
    /// after a newer one.
    pub(crate) async fn merge(&self, scraped: ResourceMap) {
        let found = scraped.len();
        let mut state = self.state.lock().await;
        let changed = state.entries.merge(scraped);
        let expires_at = Instant::now() + self.window;
        state.expires_at = Some(state.expires_at.map_or(expires_at, |at| at.max(expires_at)));
        tracing::info!(found, changed, known = state.entries.len(), "refreshed download links");
        if found < ResourceKey::ALL.len() {
            tracing::warn!(missing = ?state.entries.missing(), "download page did not list every build");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use winboxget_fetch::MockFetcher;

    const FULL_PAGE: &str = r#"
        <a href="https://download.mikrotik.com/routeros/winbox/4.0.1/WinBox_Windows.zip">Windows</a>
        <a href="https://download.mikrotik.com/routeros/winbox/4.0.1/WinBox.dmg">macOS</a>
        <a href="https://download.mikrotik.com/routeros/winbox/4.0.1/WinBox_Linux.zip">Linux</a>
        <a href="https://download.mikrotik.com/routeros/winbox/3.41/winbox64.exe">64-bit</a>
        <a href="https://download.mikrotik.com/routeros/winbox/3.41/winbox.exe">32-bit</a>
    "#;
    const MAC_ONLY_PAGE: &str = r#"
        <a href="https://download.mikrotik.com/routeros/winbox/4.0.2/WinBox.dmg">macOS</a>
    "#;
    const EMPTY_PAGE: &str = r#"<a href="/routeros">RouterOS</a>"#;

    #[tokio::test(start_paused = true)]
    async fn test_first_refresh_populates() {
        let cache = ResourceCache::new();
        let fetcher = MockFetcher::with_page(FULL_PAGE);
        assert!(cache.needs_refresh().await);
        assert_eq!(cache.lookup(ResourceKey::Winbox4Mac).await, None);

        cache.ensure_fresh(&fetcher).await.unwrap();
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(cache.snapshot().await.len(), 5);
        assert_eq!(
            cache.lookup(ResourceKey::Winbox4Mac).await.as_deref(),
            Some("https://download.mikrotik.com/routeros/winbox/4.0.1/WinBox.dmg")
        );
        let expires_at = cache.expires_at().await.unwrap();
        assert!(expires_at > Instant::now() && expires_at <= Instant::now() + FRESHNESS_WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_cache_skips_fetch() {
        let cache = ResourceCache::new();
        let fetcher = MockFetcher::with_page(FULL_PAGE);
        cache.ensure_fresh(&fetcher).await.unwrap();
        tokio::time::advance(FRESHNESS_WINDOW - Duration::from_secs(1)).await;
        cache.ensure_fresh(&fetcher).await.unwrap();
        assert_eq!(fetcher.calls(), 1);
        // Same answer on every lookup until expiry.
        for _ in 0..3 {
            let url = cache.lookup_fresh(ResourceKey::Winbox3Windows).await.unwrap();
            assert_eq!(url, "https://download.mikrotik.com/routeros/winbox/3.41/winbox64.exe");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_is_idempotent() {
        let cache = ResourceCache::new();
        let fetcher = MockFetcher::with_page(FULL_PAGE);
        cache.ensure_fresh(&fetcher).await.unwrap();
        let first_map = cache.snapshot().await;
        let first_expiry = cache.expires_at().await.unwrap();

        tokio::time::advance(FRESHNESS_WINDOW).await;
        cache.ensure_fresh(&fetcher).await.unwrap();
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(cache.snapshot().await, first_map);
        assert!(cache.expires_at().await.unwrap() > first_expiry);
    }

    #[tokio::test(start_paused = true)]
    async fn test_merge_preserves_missing_keys() {
        let cache = ResourceCache::new();
        let fetcher = MockFetcher::with_page(FULL_PAGE);
        cache.ensure_fresh(&fetcher).await.unwrap();
        let before = cache.snapshot().await;

        tokio::time::advance(FRESHNESS_WINDOW).await;
        fetcher.set_page(MAC_ONLY_PAGE).await;
        cache.ensure_fresh(&fetcher).await.unwrap();

        let after = cache.snapshot().await;
        assert_eq!(after.len(), 5);
        assert_eq!(
            after.get(ResourceKey::Winbox4Mac),
            Some("https://download.mikrotik.com/routeros/winbox/4.0.2/WinBox.dmg")
        );
        for key in ResourceKey::ALL.into_iter().filter(|k| *k != ResourceKey::Winbox4Mac) {
            assert_eq!(after.get(key), before.get(key), "{key} should be unchanged");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_scrape_still_resets_expiry() {
        let cache = ResourceCache::new();
        let fetcher = MockFetcher::with_page(EMPTY_PAGE);
        cache.ensure_fresh(&fetcher).await.unwrap();
        assert!(cache.snapshot().await.is_empty());
        assert!(cache.expires_at().await.is_some_and(|at| at > Instant::now()));
        // Nothing was found, so the next call goes upstream again regardless.
        assert!(cache.needs_refresh().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_scrape_consumes_window() {
        let cache = ResourceCache::new();
        let fetcher = MockFetcher::with_page(MAC_ONLY_PAGE);
        cache.ensure_fresh(&fetcher).await.unwrap();
        cache.ensure_fresh(&fetcher).await.unwrap();
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(cache.lookup_fresh(ResourceKey::Winbox4Linux).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_changes_nothing() {
        let cache = ResourceCache::new();
        let fetcher = MockFetcher::with_page(FULL_PAGE);
        cache.ensure_fresh(&fetcher).await.unwrap();
        let map = cache.snapshot().await;
        let expiry = cache.expires_at().await;

        tokio::time::advance(FRESHNESS_WINDOW).await;
        fetcher.set_failure(FetchErrorKind::Timeout).await;
        let err = cache.ensure_fresh(&fetcher).await.unwrap_err();
        assert_eq!(&*err, &ErrorKind::FetchFailed);
        assert_eq!(cache.snapshot().await, map);
        assert_eq!(cache.expires_at().await, expiry);
        // Stale, but still there.
        assert_eq!(cache.lookup_fresh(ResourceKey::Winbox4Windows).await, None);
        assert!(cache.lookup(ResourceKey::Winbox4Windows).await.is_some());
    }

    #[rstest::rstest]
    #[case(FetchErrorKind::Request, ErrorKind::FetchFailed)]
    #[case(FetchErrorKind::Timeout, ErrorKind::FetchFailed)]
    #[case(FetchErrorKind::Status(503), ErrorKind::FetchFailed)]
    #[case(FetchErrorKind::Body, ErrorKind::ParseFailed)]
    #[tokio::test]
    async fn test_fetch_errors_are_classified(#[case] cause: FetchErrorKind, #[case] expected: ErrorKind) {
        let cache = ResourceCache::new();
        let fetcher = MockFetcher::failing(cause);
        let err = cache.ensure_fresh(&fetcher).await.unwrap_err();
        assert_eq!(&*err, &expected);
        assert_eq!(cache.expires_at().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_never_moves_backwards() {
        let cache = ResourceCache::with_window(Duration::from_secs(60));
        cache.merge(ResourceMap::new()).await;
        let first = cache.expires_at().await.unwrap();
        // A refresh that started earlier and finishes later must not shorten
        // the window; simulate with a cache whose window shrank.
        let shorter = ResourceCache::with_window(Duration::from_secs(10));
        *shorter.state.lock().await = State { entries: ResourceMap::new(), expires_at: Some(first) };
        shorter.merge(ResourceMap::new()).await;
        assert_eq!(shorter.expires_at().await, Some(first));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_not_held_during_fetch() {
        let cache = Arc::new(ResourceCache::new());
        let fetcher = Arc::new(MockFetcher::with_page(FULL_PAGE).with_latency(Duration::from_secs(5)));
        let refresh = {
            let cache = Arc::clone(&cache);
            let fetcher = Arc::clone(&fetcher);
            tokio::spawn(async move { cache.ensure_fresh(fetcher.as_ref()).await })
        };
        while fetcher.calls() == 0 {
            tokio::task::yield_now().await;
        }
        // The refresh is parked inside the fetch; readers must not wait on it.
        let lookup = tokio::time::timeout(Duration::from_millis(1), cache.lookup(ResourceKey::Winbox4Mac)).await;
        assert_eq!(lookup.unwrap(), None);

        refresh.await.unwrap().unwrap();
        assert!(cache.lookup(ResourceKey::Winbox4Mac).await.is_some());
    }

    #[rstest::rstest]
    #[case(ResourceKey::Winbox4Windows, "https://mikrotik.com/routeros/winbox/winbox_windows64.exe")]
    #[case(ResourceKey::Winbox3Windows, "https://mikrotik.com/routeros/winbox/winbox64.exe")]
    #[case(ResourceKey::Winbox4Mac, "https://mikrotik.com/routeros/winbox/winbox.dmg")]
    #[case(ResourceKey::Winbox4Linux, "https://mikrotik.com/routeros/winbox/winbox_linux")]
    #[case(ResourceKey::Winbox3Windows32, "https://mikrotik.com/routeros/winbox/winbox.exe")]
    #[tokio::test]
    async fn test_relative_links_become_absolute(#[case] key: ResourceKey, #[case] expected: &str) {
        const RELATIVE_PAGE: &str = r#"
            <a href="/routeros/winbox/winbox_windows64.exe">WinBox 4 Windows</a>
            <a href="/routeros/winbox/winbox64.exe">WinBox 3 64-bit</a>
            <a href="/routeros/winbox/winbox.dmg">WinBox 4 macOS</a>
            <a href="/routeros/winbox/winbox_linux">WinBox 4 Linux</a>
            <a href="/routeros/winbox/winbox.exe">WinBox 3 32-bit</a>
        "#;
        let cache = ResourceCache::new();
        // Relative to the fetcher's source, https://mikrotik.com/download/winbox.
        let fetcher = MockFetcher::with_page(RELATIVE_PAGE);
        cache.ensure_fresh(&fetcher).await.unwrap();
        assert_eq!(cache.snapshot().await.len(), 5);
        assert_eq!(cache.lookup(key).await.as_deref(), Some(expected));
    }

    #[tokio::test]
    async fn test_unresponsive_upstream_is_fetch_failure() {
        use tokio::net::TcpListener;
        use winboxget_fetch::HttpFetcher;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });
        let fetcher = HttpFetcher::with_timeout(format!("http://{addr}/"), Duration::from_millis(200)).unwrap();

        let cache = ResourceCache::new();
        // Known but expired: the next refresh goes to the network.
        let entries = [(ResourceKey::Winbox4Mac, "https://mikrotik.com/routeros/winbox/winbox.dmg")].into_iter().collect();
        *cache.state.lock().await = State { entries, expires_at: None };

        let err = cache.ensure_fresh(&fetcher).await.unwrap_err();
        assert_eq!(&*err, &ErrorKind::FetchFailed);
        assert!(cache.lookup(ResourceKey::Winbox4Mac).await.is_some());
        assert_eq!(cache.expires_at().await, None);
    }
}
