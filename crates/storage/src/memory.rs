//! In-process product store.
//!
//! Products live in a [`BTreeMap`] keyed by id, so range queries walk the
//! map in key order the same way the PostgreSQL adapter walks its primary
//! key index. Nothing is persisted.

use std::collections::BTreeMap;
use std::ops::Bound;

use async_trait::async_trait;
use parking_lot::RwLock;

use keyset_core::error::StorageResult;
use keyset_core::models::{NewProduct, Product};
use keyset_core::ports::ProductRepository;

#[derive(Default)]
struct Inner {
    products: BTreeMap<i64, Product>,
    next_id: i64,
}

/// Memory-backed implementation of ProductRepository.
#[derive(Default)]
pub struct MemoryProductRepository {
    inner: RwLock<Inner>,
}

impl MemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored products.
    pub fn len(&self) -> usize {
        self.inner.read().products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn get_product(&self, id: i64) -> StorageResult<Option<Product>> {
        Ok(self.inner.read().products.get(&id).cloned())
    }

    async fn list_after(&self, after_id: i64, limit: i64) -> StorageResult<Vec<Product>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .inner
            .read()
            .products
            .range((Bound::Excluded(after_id), Bound::Unbounded))
            .take(limit)
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn count_products(&self) -> StorageResult<i64> {
        Ok(self.inner.read().products.len() as i64)
    }

    async fn exists_after(&self, id: i64) -> StorageResult<bool> {
        Ok(self
            .inner
            .read()
            .products
            .range((Bound::Excluded(id), Bound::Unbounded))
            .next()
            .is_some())
    }

    async fn list_all(&self) -> StorageResult<Vec<Product>> {
        Ok(self.inner.read().products.values().cloned().collect())
    }

    async fn ping(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn insert_products(&self, products: &[NewProduct]) -> StorageResult<u64> {
        let mut inner = self.inner.write();
        for new in products {
            inner.next_id += 1;
            let id = inner.next_id;
            inner.products.insert(
                id,
                Product {
                    id,
                    category_id: new.category_id,
                    name: new.name.clone(),
                    price: new.price,
                },
            );
        }
        Ok(products.len() as u64)
    }
}
