//! HTTP server.

use std::future::Future;
use std::time::Duration;

use axum::{Router, routing::get};
use tracing::info;

use crate::handlers::{AppState, get_product, health_check, list_all_products, list_products};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Page size used when a request omits `pageSize`.
    pub default_page_size: i64,
    /// `max-age` advertised on paged responses.
    pub cache_max_age: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            default_page_size: 20,
            cache_max_age: Duration::from_secs(120),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/all", get(list_all_products))
        .route("/products/{id}", get(get_product))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Start the HTTP server with graceful shutdown support.
pub async fn serve_with_shutdown<F>(
    state: AppState,
    config: ServerConfig,
    shutdown_signal: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("⚡ HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}
