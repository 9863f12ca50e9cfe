//! Mock product store shared by the service tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::error::{StorageError, StorageResult};
use crate::models::{NewProduct, Product};
use crate::ports::ProductRepository;

/// Vec-backed store with call counters and a failure switch.
#[derive(Default)]
pub struct MockStore {
    products: RwLock<Vec<Product>>,
    pub count_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub exists_calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl MockStore {
    /// Store holding ids `1..=n`, categories cycling through 1..=5.
    pub fn with_products(n: i64) -> Self {
        let store = Self::default();
        *store.products.write() = (1..=n).map(product).collect();
        store
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn exists_calls(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> StorageResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::ConnectionError("store offline".into()));
        }
        Ok(())
    }
}

pub fn product(id: i64) -> Product {
    Product {
        id,
        category_id: ((id - 1) % 5 + 1) as i32,
        name: format!("Product {id}"),
        price: Decimal::new(id * 100, 2),
    }
}

#[async_trait]
impl ProductRepository for MockStore {
    async fn get_product(&self, id: i64) -> StorageResult<Option<Product>> {
        self.check()?;
        Ok(self.products.read().iter().find(|p| p.id == id).cloned())
    }

    async fn list_after(&self, after_id: i64, limit: i64) -> StorageResult<Vec<Product>> {
        self.check()?;
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .products
            .read()
            .iter()
            .filter(|p| p.id > after_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count_products(&self) -> StorageResult<i64> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.products.read().len() as i64)
    }

    async fn exists_after(&self, id: i64) -> StorageResult<bool> {
        self.check()?;
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.products.read().iter().any(|p| p.id > id))
    }

    async fn list_all(&self) -> StorageResult<Vec<Product>> {
        self.check()?;
        Ok(self.products.read().clone())
    }

    async fn ping(&self) -> StorageResult<()> {
        self.check()
    }

    async fn insert_products(&self, products: &[NewProduct]) -> StorageResult<u64> {
        self.check()?;
        let mut stored = self.products.write();
        let mut next_id = stored.last().map_or(1, |p| p.id + 1);
        for new in products {
            stored.push(Product {
                id: next_id,
                category_id: new.category_id,
                name: new.name.clone(),
                price: new.price,
            });
            next_id += 1;
        }
        Ok(products.len() as u64)
    }
}
