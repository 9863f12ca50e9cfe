//! In-process page-count cache.
//!
//! Entries live in a [`HashMap`] behind a read/write lock. Lookups only take
//! the shared lock; an expired entry is reported as a miss and left for the
//! next `set` to overwrite.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use parking_lot::RwLock;
use tracing::trace;

use crate::clock::{Clock, SystemClock};
use crate::ports::PageCountCache;

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    value: i64,
    computed_at: SystemTime,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: SystemTime) -> bool {
        // A clock that moved backwards keeps the entry alive.
        now.duration_since(self.computed_at)
            .map(|age| age >= self.ttl)
            .unwrap_or(false)
    }
}

/// [`PageCountCache`] backed by process memory.
pub struct MemoryPageCountCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryPageCountCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryPageCountCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCountCache for MemoryPageCountCache {
    fn get(&self, key: &str) -> Option<i64> {
        let now = self.clock.now();
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.is_expired(now) {
            trace!(key, "Cache entry expired");
            return None;
        }
        Some(entry.value)
    }

    fn set(&self, key: &str, value: i64, ttl: Duration) {
        let entry = CacheEntry {
            value,
            computed_at: self.clock.now(),
            ttl,
        };
        self.entries.write().insert(key.to_string(), entry);
    }

    fn invalidate(&self, key: &str) {
        self.entries.write().remove(key);
    }

    fn clear(&self) {
        self.entries.write().clear();
    }
}
