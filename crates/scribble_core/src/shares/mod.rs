//! Cached, best-effort share counts from an external counting service.
//!
//! # Responsibility
//! - Fetch `total.outbound` for an item's public URL at most once per cache
//!   lifetime.
//! - Keep the cache and the HTTP source injectable.
//!
//! # Invariants
//! - `ShareCounter::count_for` never fails: every fetch or decode problem
//!   yields 0, which is cached like any other value.
//! - Cache keys are `post-id-<ID>`.
//! - Concurrent misses for the same key may both fetch.

mod cache;
mod client;

pub use cache::{CountCache, MemoryCountCache};
pub use client::{parse_share_count, ShareCountError, ShareCountSource, ShareThisClient};

use crate::model::post::PostId;
use log::{debug, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const SHARE_CACHE_KEY_PREFIX: &str = "post-id-";
/// Default expiry of cached counts.
pub const DEFAULT_SHARE_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

pub fn share_cache_key(id: PostId) -> String {
    format!("{SHARE_CACHE_KEY_PREFIX}{id}")
}

/// Cache-through share count lookup.
#[derive(Clone)]
pub struct ShareCounter {
    cache: Arc<dyn CountCache>,
    source: Arc<dyn ShareCountSource>,
    ttl: Duration,
}

impl ShareCounter {
    pub fn new(cache: Arc<dyn CountCache>, source: Arc<dyn ShareCountSource>, ttl: Duration) -> Self {
        Self { cache, source, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached count for `id`, fetching it for `public_url` on a miss.
    pub fn count_for(&self, id: PostId, public_url: &str) -> u64 {
        let key = share_cache_key(id);
        if let Some(count) = self.cache.get(&key) {
            debug!("event=share_count_cache module=shares status=hit post_id={id} count={count}");
            return count;
        }

        let started_at = Instant::now();
        let count = match self.source.fetch(public_url) {
            Ok(count) => {
                debug!(
                    "event=share_count_fetch module=shares status=ok post_id={id} count={count} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                count
            }
            Err(err) => {
                warn!(
                    "event=share_count_fetch module=shares status=error post_id={id} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                0
            }
        };

        self.cache.put(&key, count, self.ttl);
        count
    }
}

impl std::fmt::Debug for ShareCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareCounter")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
