//! `X-Pagination` header assembly.

use std::collections::BTreeMap;

use axum::http::{HeaderName, HeaderValue};
use rust_decimal::Decimal;
use serde::Serialize;

use keyset_core::models::ProductPage;
use keyset_core::services::last_page_cursor;

use crate::error::ApiError;

/// Response header carrying [`PaginationMetadata`] as JSON.
pub const X_PAGINATION: HeaderName = HeaderName::from_static("x-pagination");

/// Paging metadata sent alongside a page of products.
///
/// Serialized with PascalCase keys. URLs are relative to the server root.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaginationMetadata {
    pub page_size: i64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
    pub previous_page_url: Option<String>,
    pub average_price_per_category: BTreeMap<i32, Decimal>,
    pub next_page_url: Option<String>,
    pub first_page_url: String,
    pub last_page_url: String,
}

impl PaginationMetadata {
    /// Build metadata for `page`, which was fetched with `cursor`, linking
    /// back to `path`.
    pub fn new(page: &ProductPage, cursor: Option<i64>, path: &str) -> Self {
        let page_size = page.page_size;
        let first_page_url = page_url(path, page_size, None);

        let previous_page_url = page
            .has_previous_page
            .then(|| page_url(path, page_size, previous_cursor(page, cursor)));

        let next_page_url = if page.has_next_page {
            page.last_id().map(|id| page_url(path, page_size, Some(id)))
        } else {
            None
        };

        let last_page_url = if page.total_pages > 0 {
            page_url(
                path,
                page_size,
                Some(last_page_cursor(page.total_pages, page_size)).filter(|c| *c > 0),
            )
        } else {
            first_page_url.clone()
        };

        Self {
            page_size,
            has_previous_page: page.has_previous_page,
            has_next_page: page.has_next_page,
            previous_page_url,
            average_price_per_category: page.average_price_per_category.clone(),
            next_page_url,
            first_page_url,
            last_page_url,
        }
    }

    /// Serialize into a header value.
    pub fn to_header_value(&self) -> Result<HeaderValue, ApiError> {
        let json = serde_json::to_string(self)
            .map_err(|e| ApiError::Internal(format!("pagination metadata: {}", e)))?;
        HeaderValue::from_str(&json)
            .map_err(|e| ApiError::Internal(format!("pagination header: {}", e)))
    }
}

/// Cursor of the page before `page`, or `None` when that is the first page.
///
/// Ids are dense, so the previous page starts `page_size` ids before the
/// current one.
fn previous_cursor(page: &ProductPage, cursor: Option<i64>) -> Option<i64> {
    let start = match page.first_id() {
        Some(first) => first - 1,
        None => cursor?,
    };
    start.checked_sub(page.page_size).filter(|c| *c > 0)
}

fn page_url(path: &str, page_size: i64, cursor: Option<i64>) -> String {
    match cursor {
        Some(cursor) => format!("{path}?pageSize={page_size}&lastProductId={cursor}"),
        None => format!("{path}?pageSize={page_size}"),
    }
}
