//! Product repository implementation for PostgreSQL.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument};

use keyset_core::error::{StorageError, StorageResult};
use keyset_core::models::{NewProduct, Product};
use keyset_core::ports::ProductRepository;

use super::database::Database;

/// Rows per multi-row INSERT. Three binds per row keeps this far below the
/// 65535 bind parameter limit.
const INSERT_CHUNK_SIZE: usize = 1_000;

/// PostgreSQL implementation of ProductRepository.
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn get_product(&self, id: i64) -> StorageResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, category_id, name, price
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::QueryError(e.to_string()))?;

        row.map(ProductRow::into_product).transpose()
    }

    #[instrument(skip(self))]
    async fn list_after(&self, after_id: i64, limit: i64) -> StorageResult<Vec<Product>> {
        // Keyset range: served by the primary key index, no OFFSET scan.
        let rows: Vec<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, category_id, name, price
            FROM products
            WHERE id > $1
            ORDER BY id ASC
            LIMIT $2
            "#,
        )
        .bind(after_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::QueryError(e.to_string()))?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    async fn count_products(&self) -> StorageResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::QueryError(e.to_string()))?;

        Ok(row.0)
    }

    async fn exists_after(&self, id: i64) -> StorageResult<bool> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM products WHERE id > $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::QueryError(e.to_string()))?;

        Ok(row.0)
    }

    async fn list_all(&self) -> StorageResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, category_id, name, price
            FROM products
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::QueryError(e.to_string()))?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    async fn ping(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::ConnectionError(e.to_string()))?;
        Ok(())
    }

    #[instrument(skip_all, fields(count = products.len()))]
    async fn insert_products(&self, products: &[NewProduct]) -> StorageResult<u64> {
        if products.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::TransactionError(e.to_string()))?;

        let mut inserted = 0;
        for chunk in products.chunks(INSERT_CHUNK_SIZE) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new("INSERT INTO products (category_id, name, price) ");
            builder.push_values(chunk, |mut row, product| {
                row.push_bind(product.category_id)
                    .push_bind(&product.name)
                    .push_bind(product.price);
            });

            let result = builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| StorageError::QueryError(e.to_string()))?;
            inserted += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::TransactionError(e.to_string()))?;

        debug!(inserted, "Products inserted");
        Ok(inserted)
    }
}

/// Database row representation for Product.
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    category_id: i32,
    name: String,
    price: Decimal,
}

impl ProductRow {
    fn into_product(self) -> StorageResult<Product> {
        if self.id < 1 {
            return Err(StorageError::SerializationError(format!(
                "product.id must be positive, got {}",
                self.id
            )));
        }

        Ok(Product {
            id: self.id,
            category_id: self.category_id,
            name: self.name,
            price: self.price,
        })
    }
}
