//! Cached total page count.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::metrics::{record_total_pages_hit, record_total_pages_miss, record_total_pages_recomputed};
use crate::ports::{PageCountCache, ProductRepository};

/// Prefix of the cache keys holding page counts.
pub const TOTAL_PAGES_KEY: &str = "total_pages";

/// Default lifetime of a cached page count.
pub const DEFAULT_TOTAL_PAGES_TTL: Duration = Duration::from_secs(120);

/// Number of pages needed to hold `count` products at `page_size` per page.
pub fn pages_for(count: i64, page_size: i64) -> i64 {
    if count <= 0 {
        return 0;
    }
    (count - 1) / page_size + 1
}

/// Computes `ceil(count / page_size)` and keeps it in a [`PageCountCache`].
///
/// Concurrent callers on a cold cache may each recompute; the last write
/// wins and every entry expires after `ttl`, so no value outlives it.
pub struct TotalPageCounter {
    repository: Arc<dyn ProductRepository>,
    cache: Arc<dyn PageCountCache>,
    ttl: Duration,
}

impl TotalPageCounter {
    pub fn new(
        repository: Arc<dyn ProductRepository>,
        cache: Arc<dyn PageCountCache>,
        ttl: Duration,
    ) -> Self {
        Self {
            repository,
            cache,
            ttl,
        }
    }

    fn cache_key(page_size: i64) -> String {
        format!("{TOTAL_PAGES_KEY}:{page_size}")
    }

    /// Total number of pages for `page_size`, served from cache when fresh.
    ///
    /// A failed count leaves the cache untouched and is returned as
    /// [`CatalogError::StoreUnavailable`].
    #[instrument(skip(self))]
    pub async fn get_total_pages(&self, page_size: i64) -> CatalogResult<i64> {
        if page_size <= 0 {
            return Err(CatalogError::InvalidArgument(format!(
                "page_size must be greater than zero, got {}",
                page_size
            )));
        }

        let key = Self::cache_key(page_size);
        if let Some(total_pages) = self.cache.get(&key) {
            record_total_pages_hit();
            return Ok(total_pages);
        }
        record_total_pages_miss();

        let count = self.repository.count_products().await.map_err(|e| {
            warn!(error = %e, "Total page recomputation failed");
            CatalogError::from(e)
        })?;
        let total_pages = pages_for(count, page_size);

        self.cache.set(&key, total_pages, self.ttl);
        record_total_pages_recomputed();
        debug!(count, total_pages, "Total pages recomputed");

        Ok(total_pages)
    }

    /// Drop every cached page count. Call after any write to the store.
    pub fn invalidate(&self) {
        self.cache.clear();
        debug!("Total page cache invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryPageCountCache;
    use crate::clock::MockClock;
    use crate::models::NewProduct;
    use crate::services::testing::MockStore;
    use rust_decimal::Decimal;

    fn counter(store: Arc<MockStore>) -> (TotalPageCounter, Arc<MockClock>) {
        let clock = Arc::new(MockClock::new());
        let cache = Arc::new(MemoryPageCountCache::with_clock(clock.clone()));
        (
            TotalPageCounter::new(store, cache, DEFAULT_TOTAL_PAGES_TTL),
            clock,
        )
    }

    #[test]
    fn test_pages_for_rounds_up() {
        assert_eq!(pages_for(0, 20), 0);
        assert_eq!(pages_for(1, 20), 1);
        assert_eq!(pages_for(20, 20), 1);
        assert_eq!(pages_for(21, 20), 2);
        assert_eq!(pages_for(10_000, 20), 500);
        assert_eq!(pages_for(10_001, 20), 501);
        assert_eq!(pages_for(10, i64::MAX), 1);
        assert_eq!(pages_for(i64::MAX, i64::MAX), 1);
        assert_eq!(pages_for(i64::MAX, 1), i64::MAX);
    }

    #[tokio::test]
    async fn test_total_pages_is_ceil_of_count() {
        let store = Arc::new(MockStore::with_products(95));
        let (counter, _clock) = counter(store);

        assert_eq!(counter.get_total_pages(10).await.unwrap(), 10);
        assert_eq!(counter.get_total_pages(95).await.unwrap(), 1);
        assert_eq!(counter.get_total_pages(100).await.unwrap(), 1);
        assert_eq!(counter.get_total_pages(7).await.unwrap(), 14);
    }

    #[tokio::test]
    async fn test_recomputes_at_most_once_per_ttl() {
        let store = Arc::new(MockStore::with_products(100));
        let (counter, clock) = counter(store.clone());

        for _ in 0..5 {
            assert_eq!(counter.get_total_pages(20).await.unwrap(), 5);
        }
        assert_eq!(store.count_calls(), 1);

        clock.advance(Duration::from_secs(119));
        counter.get_total_pages(20).await.unwrap();
        assert_eq!(store.count_calls(), 1);

        clock.advance(Duration::from_secs(1));
        counter.get_total_pages(20).await.unwrap();
        assert_eq!(store.count_calls(), 2);
    }

    #[tokio::test]
    async fn test_page_sizes_are_cached_separately() {
        let store = Arc::new(MockStore::with_products(100));
        let (counter, _clock) = counter(store);

        assert_eq!(counter.get_total_pages(20).await.unwrap(), 5);
        assert_eq!(counter.get_total_pages(30).await.unwrap(), 4);
        assert_eq!(counter.get_total_pages(20).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_invalidate_then_insert_reflects_new_count() {
        let store = Arc::new(MockStore::with_products(10_000));
        let (counter, _clock) = counter(store.clone());
        assert_eq!(counter.get_total_pages(20).await.unwrap(), 500);

        counter.invalidate();
        let new: Vec<NewProduct> = (0..20)
            .map(|i| NewProduct {
                category_id: 1,
                name: format!("new-{i}"),
                price: Decimal::ONE,
            })
            .collect();
        store.insert_products(&new).await.unwrap();

        assert_eq!(counter.get_total_pages(20).await.unwrap(), 501);
        assert_eq!(store.count_calls(), 2);
    }

    // A stale cached value must never feed into the recount
    #[tokio::test]
    async fn test_recompute_uses_fresh_count() {
        let store = Arc::new(MockStore::with_products(40));
        let (counter, clock) = counter(store.clone());
        assert_eq!(counter.get_total_pages(20).await.unwrap(), 2);

        let new: Vec<NewProduct> = (0..60)
            .map(|i| NewProduct {
                category_id: 2,
                name: format!("new-{i}"),
                price: Decimal::TEN,
            })
            .collect();
        store.insert_products(&new).await.unwrap();
        clock.advance(DEFAULT_TOTAL_PAGES_TTL);

        // 100 products / 20 = 5, not 100 / 2
        assert_eq!(counter.get_total_pages(20).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_failed_count_leaves_cache_untouched() {
        let store = Arc::new(MockStore::with_products(50));
        let (counter, clock) = counter(store.clone());
        assert_eq!(counter.get_total_pages(10).await.unwrap(), 5);

        clock.advance(DEFAULT_TOTAL_PAGES_TTL);
        store.set_failing(true);
        let err = counter.get_total_pages(10).await.unwrap_err();
        assert!(matches!(err, CatalogError::StoreUnavailable(_)));

        // Next call retries the recount
        store.set_failing(false);
        assert_eq!(counter.get_total_pages(10).await.unwrap(), 5);
        assert_eq!(store.count_calls(), 3);
    }

    // Cold cache hit by many callers at once: every caller sees the same
    // count and the value written last is served afterwards
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_recompute_on_cold_cache() {
        const CALLERS: usize = 16;
        let store = Arc::new(MockStore::with_products(1_001));
        let (counter, _clock) = counter(store.clone());
        let counter = Arc::new(counter);

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..CALLERS {
            let counter = counter.clone();
            tasks.spawn(async move { counter.get_total_pages(20).await });
        }
        while let Some(result) = tasks.join_next().await {
            assert_eq!(result.unwrap().unwrap(), 51);
        }

        let recounts = store.count_calls();
        assert!((1..=CALLERS).contains(&recounts), "recounts={recounts}");

        assert_eq!(counter.get_total_pages(20).await.unwrap(), 51);
        assert_eq!(store.count_calls(), recounts);
    }

    #[tokio::test]
    async fn test_rejects_non_positive_page_size() {
        let store = Arc::new(MockStore::with_products(5));
        let (counter, _clock) = counter(store.clone());

        assert!(matches!(
            counter.get_total_pages(0).await,
            Err(CatalogError::InvalidArgument(_))
        ));
        assert_eq!(store.count_calls(), 0);
    }
}
