pub mod memory;
pub mod sqlite;

use std::time::Duration;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::{Game, GamePage};

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

/// Default entry lifetime
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Trait for cache tier implementations.
///
/// No error surface: implementations log failures and report a miss, so an
/// unavailable cache degrades to going through the store/provider.
#[async_trait]
pub trait GameCache: Send + Sync {
    /// Get a live entry
    async fn get(&self, key: &str) -> Option<CachedValue>;

    /// Store an entry that expires after `ttl`
    async fn set(&self, key: &str, value: CachedValue, ttl: Duration);
}

/// Value stored under a cache key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CachedValue {
    /// Single resolved game
    Game(Game),
    /// Title search list envelope
    Page(GamePage),
}

impl CachedValue {
    pub fn into_game(self) -> Option<Game> {
        match self {
            CachedValue::Game(game) => Some(game),
            CachedValue::Page(_) => None,
        }
    }

    pub fn into_page(self) -> Option<GamePage> {
        match self {
            CachedValue::Page(page) => Some(page),
            CachedValue::Game(_) => None,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub total_entries: u64,
    pub live_entries: u64,
    pub oldest_entry: Option<chrono::DateTime<chrono::Utc>>,
    pub newest_entry: Option<chrono::DateTime<chrono::Utc>>,
}

/// Normalize a title for consistent cache lookups
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Key for `resolve_single` results
pub fn game_key(title: &str) -> String {
    format!("game:{}", normalize_title(title))
}

/// Key for title-search list results
pub fn search_key(title: &str) -> String {
    format!("games:{}", normalize_title(title))
}
