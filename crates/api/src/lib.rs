//! HTTP API for the keyset catalog.
//!
//! Serves keyset-paginated product listings. The response body is the bare
//! JSON array of products; paging metadata travels in the `X-Pagination`
//! header so clients reach the data without unwrapping an envelope.
//!
//! # Routes
//!
//! - `GET /products?pageSize=N&lastProductId=ID` - one page
//! - `GET /products/all` - every product, unpaged
//! - `GET /products/{id}` - one product
//! - `GET /health` - product store reachability
//!
//! # Usage
//!
//! ```ignore
//! use keyset_api::{AppState, ServerConfig, serve_with_shutdown};
//!
//! let config = ServerConfig::default();
//! let state = AppState::new(pagination, &config);
//! serve_with_shutdown(state, config, shutdown_signal).await?;
//! ```

mod error;
mod handlers;
mod response;
mod server;

pub use error::ApiError;
pub use handlers::{AppState, ListProductsParams};
pub use response::{PaginationMetadata, X_PAGINATION};
pub use server::{ServerConfig, router, serve_with_shutdown};
