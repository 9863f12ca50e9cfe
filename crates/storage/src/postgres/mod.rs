//! PostgreSQL storage adapter.
//!
//! This module implements the `ProductRepository` trait defined in
//! `keyset-core` using PostgreSQL as the backing store.
//!
//! # Architecture
//!
//! - [`Database`] - Connection pool and migrations
//! - [`PgProductRepository`] - Keyset range queries over the `products` table
//!
//! # Usage
//!
//! ```ignore
//! let config = DatabaseConfig::new(&database_url);
//! let db = Database::connect(&config).await?;
//! db.migrate().await?;
//!
//! let products = PgProductRepository::new(&db);
//! ```

mod database;
mod product_repo;

pub use database::{Database, DatabaseConfig};
pub use product_repo::PgProductRepository;
