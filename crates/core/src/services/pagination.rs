//! Keyset pagination engine.
//!
//! Pages are addressed by the id of the last product the caller saw. The
//! engine picks one of three strategies per request:
//!
//! 1. **First page** - no cursor, products from id 1.
//! 2. **Last page** - the cursor equals `(total_pages - 1) * page_size`; the
//!    cached page count already tells us nothing follows, so no probe runs.
//! 3. **Middle page** - any other cursor; a probe past the last item decides
//!    `has_next_page`.
//!
//! The probe and the per-category aggregation have no data dependency and
//! are joined before the page is assembled.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::error::{CatalogError, CatalogResult};
use crate::metrics::{PageTimer, record_page_served};
use crate::models::{PageRequest, PageStrategy, Product, ProductPage};
use crate::ports::ProductRepository;

use super::aggregation::average_price_by_category;
use super::total_pages::{DEFAULT_TOTAL_PAGES_TTL, TotalPageCounter};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the pagination service.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// How long a computed total page count stays valid.
    pub total_pages_ttl: Duration,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            total_pages_ttl: DEFAULT_TOTAL_PAGES_TTL,
        }
    }
}

// =============================================================================
// PaginationService
// =============================================================================

/// Keyset pagination over the product store.
///
/// Holds no per-request state; the only shared mutable state is the page
/// count cache inside [`TotalPageCounter`].
pub struct PaginationService {
    repository: Arc<dyn ProductRepository>,
    total_pages: Arc<TotalPageCounter>,
}

impl PaginationService {
    pub fn new(repository: Arc<dyn ProductRepository>, total_pages: Arc<TotalPageCounter>) -> Self {
        Self {
            repository,
            total_pages,
        }
    }

    /// Fetch the page of `page_size` products following `cursor`.
    ///
    /// Fails with [`CatalogError::InvalidArgument`] when `page_size <= 0`,
    /// before any store access.
    #[instrument(skip(self))]
    pub async fn get_page(&self, page_size: i64, cursor: Option<i64>) -> CatalogResult<ProductPage> {
        if page_size <= 0 {
            return Err(CatalogError::InvalidArgument(format!(
                "page_size must be greater than zero, got {}",
                page_size
            )));
        }
        let _timer = PageTimer::new();

        let total_pages = self.total_pages.get_total_pages(page_size).await?;
        let strategy = select_strategy(PageRequest { page_size, cursor }, total_pages);
        let after_id = cursor.unwrap_or(0);

        let items = self.repository.list_after(after_id, page_size).await?;

        let probe = self.probe_next(strategy, &items, page_size);
        let aggregate = async { average_price_by_category(&items) };
        let (has_next_page, average_price_per_category) = tokio::join!(probe, aggregate);
        let has_next_page = has_next_page?;

        debug!(
            strategy = strategy.as_str(),
            items = items.len(),
            has_next_page,
            total_pages,
            "Page assembled"
        );
        record_page_served(strategy);

        Ok(ProductPage {
            items,
            page_size,
            has_previous_page: cursor.is_some(),
            has_next_page,
            total_pages,
            average_price_per_category,
        })
    }

    /// Every product in id order, without pagination guarantees.
    #[instrument(skip(self))]
    pub async fn get_all(&self) -> CatalogResult<Vec<Product>> {
        let products = self.repository.list_all().await?;
        debug!(count = products.len(), "Unpaged listing");
        Ok(products)
    }

    /// Whether the product store answers.
    pub async fn health_check(&self) -> CatalogResult<()> {
        Ok(self.repository.ping().await?)
    }

    /// A single product by id.
    pub async fn get_product(&self, id: i64) -> CatalogResult<Option<Product>> {
        Ok(self.repository.get_product(id).await?)
    }

    async fn probe_next(
        &self,
        strategy: PageStrategy,
        items: &[Product],
        page_size: i64,
    ) -> CatalogResult<bool> {
        if strategy == PageStrategy::Last {
            return Ok(false);
        }
        // A short page means the store ran out.
        if (items.len() as i64) < page_size {
            return Ok(false);
        }
        match items.last() {
            Some(last) => Ok(self.repository.exists_after(last.id).await?),
            None => Ok(false),
        }
    }
}

/// Pick the selection strategy for `request` given the current page count.
///
/// Ids are assumed dense: the last page is recognised by its cursor value
/// alone, and its `has_next_page` is never probed. Gaps in the id sequence
/// (for example after a rolled-back insert) end a walk at that cursor even
/// if larger ids exist.
pub fn select_strategy(request: PageRequest, total_pages: i64) -> PageStrategy {
    match request.cursor {
        None => PageStrategy::First,
        Some(cursor) if total_pages > 0 && cursor == last_page_cursor(total_pages, request.page_size) => {
            PageStrategy::Last
        }
        Some(_) => PageStrategy::Middle,
    }
}

/// Cursor that addresses the final page.
pub fn last_page_cursor(total_pages: i64, page_size: i64) -> i64 {
    (total_pages - 1) * page_size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryPageCountCache;
    use crate::clock::MockClock;
    use crate::services::testing::MockStore;

    fn service(store: Arc<MockStore>) -> PaginationService {
        let cache = Arc::new(MemoryPageCountCache::with_clock(Arc::new(MockClock::new())));
        let total_pages = Arc::new(TotalPageCounter::new(
            store.clone(),
            cache,
            DEFAULT_TOTAL_PAGES_TTL,
        ));
        PaginationService::new(store, total_pages)
    }

    fn ids(page: &ProductPage) -> Vec<i64> {
        page.items.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_strategy_selection() {
        assert_eq!(select_strategy(PageRequest::first(20), 500), PageStrategy::First);
        assert_eq!(select_strategy(PageRequest::after(20, 9980), 500), PageStrategy::Last);
        assert_eq!(select_strategy(PageRequest::after(20, 9960), 500), PageStrategy::Middle);
        assert_eq!(select_strategy(PageRequest::after(20, 10_000), 500), PageStrategy::Middle);
        // No pages: nothing can be the last page
        assert_eq!(select_strategy(PageRequest::after(20, -20), 0), PageStrategy::Middle);
    }

    #[tokio::test]
    async fn test_first_page_of_large_store() {
        let svc = service(Arc::new(MockStore::with_products(10_000)));

        let page = svc.get_page(20, None).await.unwrap();
        assert_eq!(ids(&page), (1..=20).collect::<Vec<_>>());
        assert!(!page.has_previous_page);
        assert!(page.has_next_page);
        assert_eq!(page.total_pages, 500);
        assert_eq!(page.page_size, 20);
    }

    // The first page holds page_size products, not total_pages of them
    #[tokio::test]
    async fn test_first_page_length_follows_page_size() {
        // 100 products at 30 per page -> 4 pages
        let svc = service(Arc::new(MockStore::with_products(100)));

        let page = svc.get_page(30, None).await.unwrap();
        assert_eq!(page.total_pages, 4);
        assert_eq!(ids(&page), (1..=30).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_last_page_branch() {
        let store = Arc::new(MockStore::with_products(10_000));
        let svc = service(store.clone());

        let page = svc.get_page(20, Some(9980)).await.unwrap();
        assert_eq!(ids(&page), (9981..=10_000).collect::<Vec<_>>());
        assert!(page.has_previous_page);
        assert!(!page.has_next_page);
        // Last page is answered without an existence probe
        assert_eq!(store.exists_calls(), 0);
    }

    #[tokio::test]
    async fn test_middle_page() {
        let store = Arc::new(MockStore::with_products(10_000));
        let svc = service(store.clone());

        let page = svc.get_page(20, Some(40)).await.unwrap();
        assert_eq!(ids(&page), (41..=60).collect::<Vec<_>>());
        assert!(page.has_previous_page);
        assert!(page.has_next_page);
        assert_eq!(store.exists_calls(), 1);
    }

    #[tokio::test]
    async fn test_cursor_beyond_end_is_empty() {
        let svc = service(Arc::new(MockStore::with_products(10_000)));

        let page = svc.get_page(20, Some(10_000)).await.unwrap();
        assert!(page.items.is_empty());
        assert!(page.has_previous_page);
        assert!(!page.has_next_page);
        assert!(page.average_price_per_category.is_empty());
    }

    #[tokio::test]
    async fn test_short_page_has_no_next() {
        let svc = service(Arc::new(MockStore::with_products(25)));

        let page = svc.get_page(20, Some(15)).await.unwrap();
        assert_eq!(ids(&page), (16..=25).collect::<Vec<_>>());
        assert!(!page.has_next_page);
    }

    #[tokio::test]
    async fn test_exact_remaining_count_has_no_next() {
        // First page covering the whole store
        let svc = service(Arc::new(MockStore::with_products(20)));
        let page = svc.get_page(20, None).await.unwrap();
        assert_eq!(page.items.len(), 20);
        assert!(!page.has_next_page);

        // Middle page ending exactly at the last product
        let svc = service(Arc::new(MockStore::with_products(50)));
        let page = svc.get_page(20, Some(30)).await.unwrap();
        assert_eq!(ids(&page), (31..=50).collect::<Vec<_>>());
        assert!(!page.has_next_page);
    }

    #[tokio::test]
    async fn test_page_larger_than_store() {
        let svc = service(Arc::new(MockStore::with_products(7)));

        let page = svc.get_page(100, None).await.unwrap();
        assert_eq!(ids(&page), (1..=7).collect::<Vec<_>>());
        assert!(!page.has_next_page);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn test_empty_store() {
        let svc = service(Arc::new(MockStore::default()));

        let page = svc.get_page(20, None).await.unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_next_page);
        assert!(!page.has_previous_page);
        assert_eq!(page.total_pages, 0);
    }

    #[tokio::test]
    async fn test_rejects_non_positive_page_size_before_store_access() {
        let store = Arc::new(MockStore::with_products(10));
        let svc = service(store.clone());

        for size in [0, -1, i64::MIN] {
            let err = svc.get_page(size, None).await.unwrap_err();
            assert!(matches!(err, CatalogError::InvalidArgument(_)));
        }
        assert_eq!(store.count_calls(), 0);
        assert_eq!(store.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_huge_page_size_returns_whole_store() {
        let store = Arc::new(MockStore::with_products(10));
        let svc = service(store.clone());

        let page = svc.get_page(i64::MAX, None).await.unwrap();
        assert_eq!(ids(&page), (1..=10).collect::<Vec<_>>());
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next_page);

        let page = svc.get_page(i64::MAX, Some(0)).await.unwrap();
        assert_eq!(page.items.len(), 10);
        assert_eq!(store.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_health_check_follows_store() {
        let store = Arc::new(MockStore::with_products(1));
        let svc = service(store.clone());
        assert!(svc.health_check().await.is_ok());

        store.set_failing(true);
        assert!(matches!(
            svc.health_check().await,
            Err(CatalogError::StoreUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_store_failure_is_propagated() {
        let store = Arc::new(MockStore::with_products(10));
        let svc = service(store.clone());
        store.set_failing(true);

        let err = svc.get_page(5, None).await.unwrap_err();
        assert!(matches!(err, CatalogError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_page_is_idempotent() {
        let svc = service(Arc::new(MockStore::with_products(333)));

        for cursor in [None, Some(0), Some(100), Some(320), Some(330), Some(400)] {
            let a = svc.get_page(10, cursor).await.unwrap();
            let b = svc.get_page(10, cursor).await.unwrap();
            assert_eq!(a, b);
        }
    }

    #[tokio::test]
    async fn test_round_trip_visits_every_product_once() {
        for (count, page_size) in [(0, 5), (1, 5), (99, 10), (100, 10), (101, 10), (57, 1)] {
            let svc = service(Arc::new(MockStore::with_products(count)));

            let mut seen = Vec::new();
            let mut cursor = None;
            loop {
                let page = svc.get_page(page_size, cursor).await.unwrap();
                assert!(page.items.len() as i64 <= page_size);
                if let Some(c) = cursor {
                    assert!(page.items.iter().all(|p| p.id > c));
                }
                assert!(page.items.windows(2).all(|w| w[0].id < w[1].id));

                seen.extend(ids(&page));
                if !page.has_next_page {
                    break;
                }
                cursor = page.last_id();
            }

            assert_eq!(seen, (1..=count).collect::<Vec<_>>(), "count={count} size={page_size}");
        }
    }

    #[tokio::test]
    async fn test_page_carries_category_averages() {
        let svc = service(Arc::new(MockStore::with_products(10)));

        // ids 1..=10, category (id-1)%5+1, price id.00
        let page = svc.get_page(10, None).await.unwrap();
        assert_eq!(page.average_price_per_category.len(), 5);
        // category 1 holds ids 1 and 6
        assert_eq!(
            page.average_price_per_category[&1],
            "3.50".parse::<rust_decimal::Decimal>().unwrap()
        );
    }

    #[tokio::test]
    async fn test_get_all_and_point_lookup() {
        let svc = service(Arc::new(MockStore::with_products(12)));

        assert_eq!(svc.get_all().await.unwrap().len(), 12);
        assert_eq!(svc.get_product(5).await.unwrap().map(|p| p.id), Some(5));
        assert!(svc.get_product(13).await.unwrap().is_none());
    }
}
