//! Core domain layer for the keyset catalog.
//!
//! This crate contains the domain models, port traits (interfaces), and
//! pagination services for the product catalog. It follows hexagonal
//! architecture principles - this is the innermost layer with no
//! dependencies on infrastructure.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      keyset (binary)                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │        keyset-api (HTTP)      │       keyset-storage        │
//! │   (routing, X-Pagination)     │   (PostgreSQL / memory)     │
//! ├───────────────────────────────┴─────────────────────────────┤
//! │                     keyset-core  ← YOU ARE HERE             │
//! │              (models, ports, services, cache)               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`models`] - Domain models (Product, ProductPage)
//! - [`ports`] - Interface traits for adapters to implement
//! - [`services`] - Pagination engine, total-page counter, aggregation, seeding
//! - [`cache`] - In-process page-count cache
//! - [`clock`] - Time source used for cache expiry
//! - [`error`] - Domain error types
//! - [`metrics`] - Prometheus metrics definitions
//!
//! # Key Concepts
//!
//! ## Keyset pagination
//!
//! Pages are addressed by the last product id the caller has seen instead of
//! a numeric offset, so fetching page N never scans the N-1 pages before it.
//! [`services::PaginationService`] picks one of three strategies per request
//! (first, last, middle page) and derives the navigation flags.
//!
//! ## Total page count
//!
//! The number of pages for a page size is cached by
//! [`services::TotalPageCounter`] for a fixed TTL and dropped explicitly
//! whenever a write lands in the product store.

pub mod cache;
pub mod clock;
pub mod error;
pub mod metrics;
pub mod models;
pub mod ports;
pub mod services;
