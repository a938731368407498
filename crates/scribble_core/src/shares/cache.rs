//! Expiring key/value store for share counts.

use moka::sync::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};

const MAX_CACHED_COUNTS: u64 = 10_000;

/// Process-wide count cache capability.
pub trait CountCache: Send + Sync {
    /// Returns the value when present and not expired.
    fn get(&self, key: &str) -> Option<u64>;
    fn put(&self, key: &str, value: u64, ttl: Duration);
    fn forget(&self, key: &str);
}

#[derive(Debug, Clone, Copy)]
struct CachedCount {
    value: u64,
    ttl: Duration,
}

/// Expires each entry after the ttl it was stored with.
struct PerEntryTtl;

impl Expiry<String, CachedCount> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CachedCount,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &CachedCount,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-process `CountCache` backed by `moka`; expired entries are evicted by
/// the cache's own housekeeping.
#[derive(Debug, Clone)]
pub struct MemoryCountCache {
    entries: Cache<String, CachedCount>,
}

impl MemoryCountCache {
    pub fn new() -> Self {
        Self::with_capacity(MAX_CACHED_COUNTS)
    }

    pub fn with_capacity(max_entries: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();
        Self { entries }
    }

    /// Number of stored entries after pending evictions are applied.
    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        usize::try_from(self.entries.entry_count()).unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCountCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CountCache for MemoryCountCache {
    fn get(&self, key: &str) -> Option<u64> {
        self.entries.get(key).map(|entry| entry.value)
    }

    fn put(&self, key: &str, value: u64, ttl: Duration) {
        // A zero ttl never serves a hit, so nothing is stored.
        if ttl.is_zero() {
            self.entries.invalidate(key);
            return;
        }
        self.entries
            .insert(key.to_string(), CachedCount { value, ttl });
    }

    fn forget(&self, key: &str) {
        self.entries.invalidate(key);
    }
}
