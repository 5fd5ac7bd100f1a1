use std::time::{Duration, Instant};
use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;

use crate::cache::{CachedValue, GameCache};

/// Default maximum number of entries
pub const DEFAULT_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
struct Entry {
    value: CachedValue,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-process, capacity-bounded cache tier backed by moka
pub struct MemoryCache {
    cache: Cache<String, Entry>,
}

impl MemoryCache {
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .name("game-catalog")
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();

        Self { cache }
    }

    /// Approximate number of live entries
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl GameCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<CachedValue> {
        self.cache.get(key).await.map(|entry| entry.value)
    }

    async fn set(&self, key: &str, value: CachedValue, ttl: Duration) {
        self.cache.insert(key.to_string(), Entry { value, ttl }).await;
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}
