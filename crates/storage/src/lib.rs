//! Storage layer for the keyset catalog.
//!
//! This crate provides implementations of the [`ProductRepository`] port
//! defined in `keyset-core`:
//!
//! - [`postgres::Database`] - Connection pool management and migrations
//! - [`postgres::PgProductRepository`] - PostgreSQL-backed product store
//! - [`memory::MemoryProductRepository`] - In-process store for development and tests
//!
//! # Usage
//!
//! ```ignore
//! use keyset_storage::{Database, DatabaseConfig, PgProductRepository};
//!
//! // Connect to the database
//! let config = DatabaseConfig::new(&database_url);
//! let db = Database::connect(&config).await?;
//!
//! // Run migrations
//! db.migrate().await?;
//!
//! // Create the repository
//! let products = Arc::new(PgProductRepository::new(&db));
//! ```
//!
//! [`ProductRepository`]: keyset_core::ports::ProductRepository

pub mod memory;
pub mod postgres;

pub use memory::MemoryProductRepository;
pub use postgres::{Database, DatabaseConfig, PgProductRepository};
