//! Port trait for the product store.
//!
//! This trait defines the storage interface used by the domain layer.
//! Implementations live in the infrastructure layer (e.g., `keyset-storage`).

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::models::{NewProduct, Product};

/// Repository for product data, ordered by ascending id.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Get product by id.
    async fn get_product(&self, id: i64) -> StorageResult<Option<Product>>;

    /// List up to `limit` products with `id > after_id`, ascending by id.
    async fn list_after(&self, after_id: i64, limit: i64) -> StorageResult<Vec<Product>>;

    /// Total number of products.
    async fn count_products(&self) -> StorageResult<i64>;

    /// Whether any product has `id > id`.
    async fn exists_after(&self, id: i64) -> StorageResult<bool>;

    /// Every product, ascending by id. Unpaged.
    async fn list_all(&self) -> StorageResult<Vec<Product>>;

    /// Round-trip to the store without touching product data.
    async fn ping(&self) -> StorageResult<()>;

    /// Insert a batch of products, returning how many were written.
    ///
    /// Callers that hold a page-count cache must invalidate it afterwards.
    async fn insert_products(&self, products: &[NewProduct]) -> StorageResult<u64>;
}
