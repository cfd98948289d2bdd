//! Fetch strategies
//!
//! Each strategy decides, for one request, the order in which the network,
//! the routed cache partition and the fallback generator are consulted.
//!
//! | Strategy | First | Then | Last resort |
//! |----------|-------|------|-------------|
//! | CacheFirst | partition (refresh in background) | network | fallback |
//! | NetworkFirst | network | partition | fallback |
//! | NetworkFirstWithTimeout | network, raced against a timer | partition | 503 JSON |
//!
//! A successful (2xx) network answer to a GET/HEAD is written to the
//! partition before the strategy returns, so an immediate retry sees it.

pub mod refresh;

pub use refresh::RefreshPool;

use crate::error::{WardenError, WardenResult};
use crate::fallback;
use crate::network::Fetcher;
use crate::request::{Category, Request, Response, FROM_CACHE_HEADER};
use crate::store::{CacheEntry, CacheStore, PartitionId, PartitionName};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

/// Path of the app shell served to documents when offline
const APP_SHELL_PATH: &str = "/";

/// Strategy identifiers used by the routing table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
    NetworkFirstWithTimeout(Duration),
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CacheFirst => write!(f, "cache-first"),
            Self::NetworkFirst => write!(f, "network-first"),
            Self::NetworkFirstWithTimeout(t) => {
                write!(f, "network-first-timeout({}ms)", t.as_millis())
            }
        }
    }
}

/// Aborts a spawned fetch if the caller goes away before the race settles
struct AbortOnDrop(Option<AbortHandle>);

impl AbortOnDrop {
    fn disarm(&mut self) {
        self.0 = None;
    }
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        if let Some(handle) = self.0.take() {
            handle.abort();
        }
    }
}

/// Executes strategies against a shared store and fetcher
///
/// Cheap to clone; clones share the store, fetcher and refresh pool.
#[derive(Clone)]
pub struct StrategyEngine {
    store: Arc<dyn CacheStore>,
    fetcher: Arc<dyn Fetcher>,
    refresh: RefreshPool,
    version: Arc<str>,
}

impl StrategyEngine {
    pub fn new(
        store: Arc<dyn CacheStore>,
        fetcher: Arc<dyn Fetcher>,
        version: &str,
        max_concurrent_refreshes: usize,
    ) -> Self {
        Self {
            store,
            fetcher,
            refresh: RefreshPool::new(max_concurrent_refreshes),
            version: Arc::from(version),
        }
    }

    /// Current-build id of a logical partition
    pub fn partition(&self, name: PartitionName) -> PartitionId {
        PartitionId::new(name, self.version.as_ref())
    }

    /// Background refresh pool
    pub fn refresh_pool(&self) -> &RefreshPool {
        &self.refresh
    }

    /// Shared store handle
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Shared fetcher handle
    pub fn fetcher(&self) -> &Arc<dyn Fetcher> {
        &self.fetcher
    }

    /// Run `strategy` for a classified request
    pub async fn execute(
        &self,
        request: &Request,
        category: Category,
        strategy: Strategy,
        partition: PartitionName,
    ) -> WardenResult<Response> {
        let partition = self.partition(partition);
        debug!(
            request_id = %request.id,
            %category,
            %strategy,
            %partition,
            "{} {}",
            request.method,
            request.url
        );

        match strategy {
            Strategy::CacheFirst => self.cache_first(request, category, &partition).await,
            Strategy::NetworkFirst => self.network_first(request, category, &partition).await,
            Strategy::NetworkFirstWithTimeout(timeout) => {
                self.network_first_with_timeout(request, &partition, timeout)
                    .await
            }
        }
    }

    /// Serve from the partition, refreshing in the background; fetch on miss
    pub async fn cache_first(
        &self,
        request: &Request,
        category: Category,
        partition: &PartitionId,
    ) -> WardenResult<Response> {
        if let Some(cached) = self.lookup(partition, request).await {
            debug!(request_id = %request.id, "Cache hit in {}", partition);
            self.schedule_refresh(request, partition);
            return Ok(cached);
        }

        match self.fetch_and_store(request, partition).await {
            Ok(response) => Ok(response),
            Err(e) => self.fallback(request, category, e).await,
        }
    }

    /// Fetch first, fall back to the partition, then to synthesized content
    pub async fn network_first(
        &self,
        request: &Request,
        category: Category,
        partition: &PartitionId,
    ) -> WardenResult<Response> {
        let err = match self.fetch_and_store(request, partition).await {
            Ok(response) => return Ok(response),
            Err(e) => e,
        };

        debug!(request_id = %request.id, "Fetch failed, trying {}: {}", partition, err);
        if let Some(cached) = self.lookup(partition, request).await {
            return Ok(cached);
        }

        self.fallback(request, category, err).await
    }

    /// Race the network against `timeout`; on loss use the partition or a 503
    ///
    /// A fetch that loses the race keeps running and still populates the
    /// partition when it succeeds. It is aborted only if the caller abandons
    /// the request before the race settles.
    pub async fn network_first_with_timeout(
        &self,
        request: &Request,
        partition: &PartitionId,
        timeout: Duration,
    ) -> WardenResult<Response> {
        let engine = self.clone();
        let req = request.clone();
        let target = partition.clone();
        let handle = tokio::spawn(async move { engine.fetch_and_store(&req, &target).await });

        let mut guard = AbortOnDrop(Some(handle.abort_handle()));
        let outcome = tokio::time::timeout(timeout, handle).await;
        guard.disarm();

        match outcome {
            Ok(Ok(Ok(response))) => return Ok(response),
            Ok(Ok(Err(e))) if e.is_network() => {
                debug!(request_id = %request.id, "Network failed: {}", e);
            }
            Ok(Ok(Err(e))) => {
                warn!(request_id = %request.id, "Fetch rejected: {}", e);
            }
            Ok(Err(join_err)) => {
                warn!(request_id = %request.id, "Fetch task failed: {}", join_err);
            }
            Err(_) => {
                debug!(
                    request_id = %request.id,
                    "No response within {}ms, network continues in background",
                    timeout.as_millis()
                );
            }
        }

        if let Some(mut cached) = self.lookup(partition, request).await {
            cached.set_header(FROM_CACHE_HEADER, "true");
            return Ok(cached);
        }

        Ok(fallback::offline_api())
    }

    /// Fetch and, for cacheable 2xx answers, store before returning
    pub async fn fetch_and_store(
        &self,
        request: &Request,
        partition: &PartitionId,
    ) -> WardenResult<Response> {
        let response = self.fetcher.fetch(request).await?;
        if response.is_success() {
            self.put(partition, request, &response).await;
        } else {
            debug!(
                request_id = %request.id,
                "Not caching status {} for {}",
                response.status,
                request.url
            );
        }
        Ok(response)
    }

    /// Fetch and store, treating a non-2xx answer as a failure
    pub async fn refresh_entry(&self, request: &Request, partition: &PartitionId) -> WardenResult<()> {
        let response = self.fetch_and_store(request, partition).await?;
        if !response.is_success() {
            return Err(WardenError::UpstreamStatus {
                url: request.url.to_string(),
                status: response.status,
            });
        }
        Ok(())
    }

    fn schedule_refresh(&self, request: &Request, partition: &PartitionId) {
        if !request.is_cacheable() {
            return;
        }
        let engine = self.clone();
        let req = request.clone();
        let target = partition.clone();
        self.refresh.schedule(request.key(), async move {
            engine.refresh_entry(&req, &target).await
        });
    }

    /// Partition read; a damaged entry counts as a miss
    async fn lookup(&self, partition: &PartitionId, request: &Request) -> Option<Response> {
        if !request.is_cacheable() {
            return None;
        }
        match self.store.get(partition, &request.key()).await {
            Ok(entry) => entry.map(|e| e.response),
            Err(e) => {
                warn!(request_id = %request.id, "Cache read failed, treating as miss: {}", e);
                None
            }
        }
    }

    /// Partition write; failures are logged and the write dropped
    async fn put(&self, partition: &PartitionId, request: &Request, response: &Response) {
        if !request.is_cacheable() {
            return;
        }
        let entry = CacheEntry::new(request.key(), response.clone());
        if let Err(e) = self.store.put(partition, entry).await {
            warn!(request_id = %request.id, "Cache write to {} dropped: {}", partition, e);
        }
    }

    /// Last resort once network and partition are exhausted
    ///
    /// Any fetch error lands here, not only transport failures. Documents get
    /// the cached app shell if there is one. Categories with no synthesized
    /// content return the original error.
    async fn fallback(
        &self,
        request: &Request,
        category: Category,
        err: WardenError,
    ) -> WardenResult<Response> {
        if category == Category::Document {
            if let Ok(shell) = Request::for_path(&request.url, APP_SHELL_PATH) {
                let partition = self.partition(PartitionName::Static);
                if let Some(cached) = self.lookup(&partition, &shell).await {
                    debug!(request_id = %request.id, "Serving cached app shell");
                    return Ok(cached);
                }
            }
        }

        fallback::for_category(category).ok_or(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::mock::MockFetcher;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use crate::request::{CacheKey, Destination};
    use tokio::time::Instant;

    const ORIGIN: &str = "https://app.test";

    fn setup() -> (StrategyEngine, Arc<MockFetcher>, Arc<MemoryStore>) {
        let fetcher = Arc::new(MockFetcher::new());
        let store = Arc::new(MemoryStore::new());
        let engine = StrategyEngine::new(store.clone(), fetcher.clone(), "v1", 4);
        (engine, fetcher, store)
    }

    fn url(path: &str) -> String {
        format!("{}{}", ORIGIN, path)
    }

    fn get(path: &str) -> Request {
        Request::get(&url(path)).unwrap()
    }

    fn static_v1() -> PartitionId {
        PartitionId::new(PartitionName::Static, "v1")
    }

    #[tokio::test(start_paused = true)]
    async fn cache_first_hit_does_not_wait_for_network() {
        let (engine, fetcher, store) = setup();
        let req = get("/assets/index.js");
        store
            .put(
                &static_v1(),
                CacheEntry::new(req.key(), Response::new(200).with_body("cached")),
            )
            .await
            .unwrap();
        fetcher.respond_after(&url("/assets/index.js"), Duration::from_secs(10), 200, "text/javascript", "fresh");

        let start = Instant::now();
        let resp = engine
            .cache_first(&req, Category::StyleScript, &static_v1())
            .await
            .unwrap();

        assert_eq!(resp.body, b"cached");
        assert!(start.elapsed() < Duration::from_millis(1));
        assert_eq!(engine.refresh_pool().in_flight(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cache_first_repeat_returns_stored_body_then_refreshes() {
        let (engine, fetcher, _) = setup();
        let req = get("/assets/app.css");
        fetcher.respond(&url("/assets/app.css"), 200, "text/css", "one");

        let first = engine.cache_first(&req, Category::StyleScript, &static_v1()).await.unwrap();
        assert_eq!(first.body, b"one");

        fetcher.respond(&url("/assets/app.css"), 200, "text/css", "two");
        let second = engine.cache_first(&req, Category::StyleScript, &static_v1()).await.unwrap();
        assert_eq!(second.body, b"one");

        engine.refresh_pool().wait_idle().await;
        let third = engine.cache_first(&req, Category::StyleScript, &static_v1()).await.unwrap();
        assert_eq!(third.body, b"two");
    }

    #[tokio::test(start_paused = true)]
    async fn cache_first_refresh_deduplicated() {
        let (engine, fetcher, store) = setup();
        let req = get("/assets/logo.svg");
        store
            .put(&static_v1(), CacheEntry::new(req.key(), Response::new(200).with_body("x")))
            .await
            .unwrap();
        fetcher.respond_after(&url("/assets/logo.svg"), Duration::from_secs(1), 200, "image/svg+xml", "y");

        for _ in 0..10 {
            engine.cache_first(&req, Category::StyleScript, &static_v1()).await.unwrap();
        }
        engine.refresh_pool().wait_idle().await;

        assert_eq!(fetcher.calls(&url("/assets/logo.svg")), 1);
    }

    #[tokio::test]
    async fn cache_first_failed_refresh_keeps_entry() {
        let (engine, fetcher, store) = setup();
        let req = get("/assets/index.js");
        store
            .put(&static_v1(), CacheEntry::new(req.key(), Response::new(200).with_body("keep")))
            .await
            .unwrap();
        fetcher.fail(&url("/assets/index.js"));

        engine.cache_first(&req, Category::StyleScript, &static_v1()).await.unwrap();
        engine.refresh_pool().wait_idle().await;

        let entry = store.get(&static_v1(), &req.key()).await.unwrap().unwrap();
        assert_eq!(entry.response.body, b"keep");
    }

    #[tokio::test]
    async fn image_offline_without_cache_gets_placeholder() {
        let (engine, fetcher, _) = setup();
        fetcher.set_online(false);
        let req = get("/avatars/guanyin.png").with_destination(Destination::Image);
        let dynamic = engine.partition(PartitionName::Dynamic);

        let resp = engine.cache_first(&req, Category::Image, &dynamic).await.unwrap();
        assert_eq!(resp.content_type(), Some("image/svg+xml"));
        assert!(resp.text().contains("<svg"));
    }

    #[tokio::test]
    async fn script_offline_without_cache_propagates_error() {
        let (engine, fetcher, _) = setup();
        fetcher.set_online(false);
        let err = engine
            .cache_first(&get("/assets/missing.js"), Category::StyleScript, &static_v1())
            .await
            .unwrap_err();
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn network_first_document_survives_going_offline() {
        let (engine, fetcher, _) = setup();
        let req = get("/index.html").with_destination(Destination::Document);
        fetcher.respond(&url("/index.html"), 200, "text/html", "<h1>live</h1>");

        let online = engine.network_first(&req, Category::Document, &static_v1()).await.unwrap();
        assert_eq!(online.status, 200);

        fetcher.set_online(false);
        let offline = engine.network_first(&req, Category::Document, &static_v1()).await.unwrap();
        assert_eq!(offline.status, 200);
        assert_eq!(offline.body, online.body);
    }

    #[tokio::test]
    async fn network_first_non_success_returned_not_cached() {
        let (engine, fetcher, store) = setup();
        let req = get("/missing");
        fetcher.respond(&url("/missing"), 404, "text/plain", "nope");
        let dynamic = engine.partition(PartitionName::Dynamic);

        let resp = engine.network_first(&req, Category::Other, &dynamic).await.unwrap();
        assert_eq!(resp.status, 404);
        assert!(store.get(&dynamic, &req.key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn network_first_other_offline_propagates_error() {
        let (engine, fetcher, _) = setup();
        fetcher.set_online(false);
        let dynamic = engine.partition(PartitionName::Dynamic);

        let err = engine
            .network_first(&get("/robots.txt"), Category::Other, &dynamic)
            .await
            .unwrap_err();
        assert!(matches!(err, WardenError::NetworkUnavailable { .. }));
    }

    #[tokio::test]
    async fn document_offline_prefers_cached_shell() {
        let (engine, fetcher, store) = setup();
        store
            .put(&static_v1(), CacheEntry::new(get("/").key(), Response::new(200).with_body("shell")))
            .await
            .unwrap();
        fetcher.set_online(false);

        let req = get("/deep/link").with_destination(Destination::Document);
        let resp = engine.network_first(&req, Category::Document, &static_v1()).await.unwrap();
        assert_eq!(resp.body, b"shell");
    }

    #[tokio::test]
    async fn document_offline_without_shell_gets_offline_page() {
        let (engine, fetcher, _) = setup();
        fetcher.set_online(false);

        let req = get("/deep/link").with_destination(Destination::Document);
        let resp = engine.network_first(&req, Category::Document, &static_v1()).await.unwrap();
        assert_eq!(resp.header(FROM_CACHE_HEADER), Some("offline-page"));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_without_cache_is_503_at_deadline() {
        let (engine, fetcher, store) = setup();
        let path = "/divine/fortune?date=2024-01-01";
        fetcher.respond_after(&url(path), Duration::from_millis(5000), 200, "application/json", r#"{"luck":9}"#);
        let api = engine.partition(PartitionName::Api);

        let start = Instant::now();
        let resp = engine
            .network_first_with_timeout(&get(path), &api, Duration::from_millis(3000))
            .await
            .unwrap();
        let elapsed = start.elapsed();

        assert_eq!(resp.status, 503);
        assert!(elapsed >= Duration::from_millis(3000) && elapsed < Duration::from_millis(3100));
        let json: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(json["error"], "offline");
        assert!(json["message"].is_string());
        assert!(json["timestamp"].is_number());

        // the losing fetch still lands in the partition
        tokio::time::sleep(Duration::from_millis(2500)).await;
        let entry = store.get(&api, &get(path).key()).await.unwrap().unwrap();
        assert_eq!(entry.response.body, br#"{"luck":9}"#);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_with_cache_serves_marked_entry() {
        let (engine, fetcher, store) = setup();
        let req = get("/api/user");
        let api = engine.partition(PartitionName::Api);
        store
            .put(&api, CacheEntry::new(req.key(), Response::new(200).with_body("old")))
            .await
            .unwrap();
        fetcher.respond_after(&url("/api/user"), Duration::from_secs(60), 200, "application/json", "new");

        let resp = engine
            .network_first_with_timeout(&req, &api, Duration::from_millis(3000))
            .await
            .unwrap();
        assert_eq!(resp.body, b"old");
        assert_eq!(resp.header(FROM_CACHE_HEADER), Some("true"));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_fast_network_wins() {
        let (engine, fetcher, store) = setup();
        let req = get("/api/user");
        let api = engine.partition(PartitionName::Api);
        fetcher.respond_after(&url("/api/user"), Duration::from_millis(200), 200, "application/json", "live");

        let resp = engine
            .network_first_with_timeout(&req, &api, Duration::from_millis(3000))
            .await
            .unwrap();
        assert_eq!(resp.body, b"live");
        assert!(store.get(&api, &req.key()).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_request_aborts_its_fetch() {
        let (engine, fetcher, store) = setup();
        let req = get("/api/slow");
        let api = engine.partition(PartitionName::Api);
        fetcher.respond_after(&url("/api/slow"), Duration::from_millis(1000), 200, "application/json", "late");

        let pending = engine.network_first_with_timeout(&req, &api, Duration::from_millis(3000));
        let abandoned = tokio::time::timeout(Duration::from_millis(100), pending).await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(store.get(&api, &req.key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn post_skips_cache_but_still_gets_structured_503() {
        let (engine, fetcher, store) = setup();
        fetcher.set_online(false);
        let api = engine.partition(PartitionName::Api);
        let post = Request::new("POST", &url("/api/calculate-bazi")).unwrap();
        store
            .put(&api, CacheEntry::new(CacheKey::new("POST", &post.url), Response::new(200).with_body("stale")))
            .await
            .unwrap();

        let resp = engine
            .network_first_with_timeout(&post, &api, Duration::from_millis(3000))
            .await
            .unwrap();
        assert_eq!(resp.status, 503);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_api_fetch_still_gets_structured_503() {
        let (engine, fetcher, _) = setup();
        let api = engine.partition(PartitionName::Api);
        fetcher.reject(&url("/api/user"), "Unsupported HTTP method: OPTIONS");

        let resp = engine
            .network_first_with_timeout(&get("/api/user"), &api, Duration::from_millis(3000))
            .await
            .unwrap();
        assert_eq!(resp.status, 503);
        assert_eq!(resp.header(FROM_CACHE_HEADER), Some("offline-fallback"));
    }

    #[tokio::test]
    async fn rejected_document_fetch_stays_renderable() {
        let (engine, fetcher, _) = setup();
        fetcher.reject(&url("/deep/link"), "fetch task failed");

        let req = get("/deep/link").with_destination(Destination::Document);
        let resp = engine.network_first(&req, Category::Document, &static_v1()).await.unwrap();
        assert_eq!(resp.header(FROM_CACHE_HEADER), Some("offline-page"));
    }

    #[tokio::test]
    async fn rejected_image_fetch_gets_placeholder() {
        let (engine, fetcher, _) = setup();
        fetcher.reject(&url("/avatars/a.png"), "fetch task failed");
        let dynamic = engine.partition(PartitionName::Dynamic);

        let req = get("/avatars/a.png").with_destination(Destination::Image);
        let resp = engine.cache_first(&req, Category::Image, &dynamic).await.unwrap();
        assert_eq!(resp.content_type(), Some("image/svg+xml"));
    }

    #[tokio::test]
    async fn rejected_other_fetch_returns_original_error() {
        let (engine, fetcher, _) = setup();
        fetcher.reject(&url("/robots.txt"), "fetch task failed");
        let dynamic = engine.partition(PartitionName::Dynamic);

        let err = engine
            .network_first(&get("/robots.txt"), Category::Other, &dynamic)
            .await
            .unwrap_err();
        assert!(matches!(err, WardenError::User(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn image_cache_hit_does_not_wait_for_network() {
        let (engine, fetcher, store) = setup();
        let req = get("/avatars/guanyin.png").with_destination(Destination::Image);
        let dynamic = engine.partition(PartitionName::Dynamic);
        store
            .put(&dynamic, CacheEntry::new(req.key(), Response::new(200).with_body("png")))
            .await
            .unwrap();
        fetcher.respond_after(&url("/avatars/guanyin.png"), Duration::from_secs(10), 200, "image/png", "new");

        let start = Instant::now();
        let resp = engine.cache_first(&req, Category::Image, &dynamic).await.unwrap();

        assert_eq!(resp.body, b"png");
        assert!(start.elapsed() < Duration::from_millis(1));
        assert_eq!(engine.refresh_pool().in_flight(), 1);
        assert!(store.get(&static_v1(), &req.key()).await.unwrap().is_none());
    }

    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn open(&self, _: &PartitionId) -> WardenResult<()> {
            Ok(())
        }
        async fn get(&self, p: &PartitionId, _: &CacheKey) -> WardenResult<Option<CacheEntry>> {
            Err(WardenError::corrupt(p.to_string(), "unreadable"))
        }
        async fn put(&self, p: &PartitionId, _: CacheEntry) -> WardenResult<()> {
            Err(WardenError::corrupt(p.to_string(), "quota exceeded"))
        }
        async fn count(&self, _: &PartitionId) -> WardenResult<usize> {
            Ok(0)
        }
        async fn entries(&self, _: &PartitionId, _: usize) -> WardenResult<Vec<CacheEntry>> {
            Ok(vec![])
        }
        async fn partitions(&self) -> WardenResult<Vec<String>> {
            Ok(vec![])
        }
        async fn delete_partition(&self, _: &str) -> WardenResult<bool> {
            Ok(false)
        }
        fn backend_name(&self) -> &'static str {
            "broken"
        }
    }

    #[tokio::test]
    async fn corrupt_store_degrades_to_network_and_fallback() {
        let fetcher = Arc::new(MockFetcher::new());
        let engine = StrategyEngine::new(Arc::new(BrokenStore), fetcher.clone(), "v1", 1);
        let req = get("/index.html").with_destination(Destination::Document);
        fetcher.respond(&url("/index.html"), 200, "text/html", "live");

        let resp = engine.network_first(&req, Category::Document, &static_v1()).await.unwrap();
        assert_eq!(resp.body, b"live");

        fetcher.set_online(false);
        let resp = engine.network_first(&req, Category::Document, &static_v1()).await.unwrap();
        assert_eq!(resp.header(FROM_CACHE_HEADER), Some("offline-page"));
    }
}
