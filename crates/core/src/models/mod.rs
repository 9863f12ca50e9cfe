//! Domain models for the product catalog.
//!
//! These models are storage-agnostic and represent the canonical
//! form of catalog data within the domain layer.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Product
// =============================================================================

/// A product as stored in the catalog.
///
/// Products are immutable once created. The `id` is assigned by the store,
/// starts at 1 and increases monotonically, which is what makes it usable as
/// a pagination cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique, monotonically increasing identifier.
    pub id: i64,
    /// Category the product belongs to.
    pub category_id: i32,
    /// Display name.
    pub name: String,
    /// Unit price, two decimal places.
    pub price: Decimal,
}

/// Insert payload for a product. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub category_id: i32,
    pub name: String,
    pub price: Decimal,
}

// =============================================================================
// Paging
// =============================================================================

/// A page request as received from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Maximum number of products to return. Must be positive.
    pub page_size: i64,
    /// Last product id the caller has already seen.
    pub cursor: Option<i64>,
}

impl PageRequest {
    /// Request the first page.
    pub fn first(page_size: i64) -> Self {
        Self {
            page_size,
            cursor: None,
        }
    }

    /// Request the page after `cursor`.
    pub fn after(page_size: i64, cursor: i64) -> Self {
        Self {
            page_size,
            cursor: Some(cursor),
        }
    }
}

/// One page of products plus its navigation flags and aggregates.
///
/// `items` is a contiguous run of the ascending-id ordering: every id is
/// greater than the request cursor and there is no gap between consecutive
/// items in store order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub page_size: i64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
    pub total_pages: i64,
    /// Average price per category over `items` only.
    pub average_price_per_category: BTreeMap<i32, Decimal>,
}

impl ProductPage {
    /// Id of the first product on the page.
    pub fn first_id(&self) -> Option<i64> {
        self.items.first().map(|p| p.id)
    }

    /// Id of the last product on the page.
    pub fn last_id(&self) -> Option<i64> {
        self.items.last().map(|p| p.id)
    }
}

/// Which selection strategy produced a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStrategy {
    /// No cursor: products from id 1.
    First,
    /// Cursor sits at the start of the final page.
    Last,
    /// Any other cursor.
    Middle,
}

impl PageStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageStrategy::First => "first",
            PageStrategy::Last => "last",
            PageStrategy::Middle => "middle",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
