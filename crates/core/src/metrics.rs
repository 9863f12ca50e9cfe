//! Metrics definitions for the catalog.
//!
//! This module defines all metrics used by the pagination services.
//! Metrics are collected using the `metrics` crate and can be exported
//! to Prometheus via `metrics-exporter-prometheus`.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

use crate::models::PageStrategy;

/// Initialize all metric descriptions.
/// Call this once at startup before any metrics are recorded.
pub fn init_metrics() {
    describe_counter!(
        "pages_served_total",
        "Total number of product pages served, by selection strategy"
    );
    describe_histogram!(
        "page_fetch_duration_seconds",
        "Time taken to assemble a product page in seconds"
    );
    describe_counter!(
        "total_pages_cache_hits_total",
        "Total number of total-page lookups answered from cache"
    );
    describe_counter!(
        "total_pages_cache_misses_total",
        "Total number of total-page lookups that missed the cache"
    );
    describe_counter!(
        "total_pages_recomputed_total",
        "Total number of successful total-page recomputations"
    );
}

/// Record a served page.
///
/// # Arguments
/// * `strategy` - Which selection strategy produced the page
pub fn record_page_served(strategy: PageStrategy) {
    counter!("pages_served_total", "strategy" => strategy.as_str()).increment(1);
}

/// Record a cache hit for the total page count.
pub fn record_total_pages_hit() {
    counter!("total_pages_cache_hits_total").increment(1);
}

/// Record a cache miss for the total page count.
pub fn record_total_pages_miss() {
    counter!("total_pages_cache_misses_total").increment(1);
}

/// Record a completed total page recomputation.
pub fn record_total_pages_recomputed() {
    counter!("total_pages_recomputed_total").increment(1);
}

/// Record page assembly duration.
pub fn record_page_fetch_duration(duration_secs: f64) {
    histogram!("page_fetch_duration_seconds").record(duration_secs);
}

/// A timer that automatically records page assembly duration when dropped.
pub struct PageTimer {
    start: Instant,
}

impl PageTimer {
    /// Start a new page timer.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for PageTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PageTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_page_fetch_duration(duration);
    }
}
