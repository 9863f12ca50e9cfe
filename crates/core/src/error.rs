//! Error types for the catalog domain layer.
//!
//! This module defines two error types:
//!
//! - [`StorageError`] - Database/repository errors
//! - [`CatalogError`] - Errors returned by the pagination services
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Storage Errors
// =============================================================================

/// Database and repository errors.
///
/// These errors originate from storage operations like queries,
/// migrations, and row decoding.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to establish database connection.
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// SQL query execution failed.
    #[error("Query execution error: {0}")]
    QueryError(String),

    /// Database migration failed.
    #[error("Migration error: {0}")]
    MigrationError(String),

    /// Transaction commit/rollback failed.
    #[error("Transaction error: {0}")]
    TransactionError(String),

    /// A stored row could not be converted into a domain model.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// =============================================================================
// Catalog Errors
// =============================================================================

/// Errors surfaced by the pagination engine and its collaborators.
///
/// An empty page is never an error: a valid request past the end of the
/// store yields a [`crate::models::ProductPage`] with no items.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request was rejected before touching the store.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The product store failed to answer a query.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StorageError),
}

impl CatalogError {
    /// Whether the error was caused by the caller rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, CatalogError::InvalidArgument(_))
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
