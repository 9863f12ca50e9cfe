//! HTTP route handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use keyset_core::services::PaginationService;

use crate::error::ApiError;
use crate::response::{PaginationMetadata, X_PAGINATION};
use crate::server::ServerConfig;

/// Path the paged listing is mounted on. Navigation URLs point here.
pub(crate) const PRODUCTS_PATH: &str = "/products";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub pagination: Arc<PaginationService>,
    pub default_page_size: i64,
    pub cache_control: HeaderValue,
}

impl AppState {
    pub fn new(pagination: Arc<PaginationService>, config: &ServerConfig) -> Self {
        let cache_control = HeaderValue::from_str(&format!(
            "public, max-age={}",
            config.cache_max_age.as_secs()
        ))
        .unwrap_or_else(|_| HeaderValue::from_static("no-cache"));

        Self {
            pagination,
            default_page_size: config.default_page_size,
            cache_control,
        }
    }
}

/// Query parameters of `GET /products`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsParams {
    pub page_size: Option<i64>,
    pub last_product_id: Option<i64>,
}

/// Handle GET /products
///
/// Body is the JSON array of products; metadata goes in `X-Pagination`.
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListProductsParams>,
) -> Result<Response, ApiError> {
    let page_size = params.page_size.unwrap_or(state.default_page_size);
    let page = state
        .pagination
        .get_page(page_size, params.last_product_id)
        .await?;

    let metadata = PaginationMetadata::new(&page, params.last_product_id, PRODUCTS_PATH);
    let header_value = metadata.to_header_value()?;

    Ok((
        [
            (X_PAGINATION, header_value),
            (header::CACHE_CONTROL, state.cache_control.clone()),
        ],
        Json(page.items),
    )
        .into_response())
}

/// Handle GET /products/all
///
/// Returns `204 No Content` when the store is empty.
pub async fn list_all_products(State(state): State<AppState>) -> Result<Response, ApiError> {
    let products = state.pagination.get_all().await?;
    if products.is_empty() {
        debug!("No products to list");
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    Ok(Json(products).into_response())
}

/// Handle GET /products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    match state.pagination.get_product(id).await? {
        Some(product) => Ok(Json(product).into_response()),
        None => Err(ApiError::NotFound(format!("product {} not found", id))),
    }
}

/// Health check endpoint.
///
/// `503` when the product store does not answer.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.pagination.health_check().await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE")
        }
    }
}
