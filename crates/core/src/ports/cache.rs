//! Port trait for the page-count cache.

use std::time::Duration;

/// Key/value cache for computed page counts.
///
/// Entries expire after their TTL; an expired entry reads as a miss.
pub trait PageCountCache: Send + Sync {
    /// Cached value for `key`, if present and unexpired.
    fn get(&self, key: &str) -> Option<i64>;

    /// Store `value` under `key` for `ttl`, replacing any previous entry.
    fn set(&self, key: &str, value: i64, ttl: Duration);

    /// Remove the entry for `key`.
    fn invalidate(&self, key: &str);

    /// Remove every entry.
    fn clear(&self);
}
