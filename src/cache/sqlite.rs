use std::time::Duration;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::cache::{CacheStats, CachedValue, GameCache};
use crate::db::SqliteHandle;
use crate::error::Result;

/// SQLite-based cache tier; entries survive restarts.
///
/// Schema:
/// ```sql
/// CREATE TABLE cache_entries (
///     key TEXT PRIMARY KEY,
///     value TEXT NOT NULL,
///     cached_at TEXT NOT NULL,
///     expires_at INTEGER NOT NULL  -- unix milliseconds
/// );
/// ```
pub struct SqliteCache {
    db: SqliteHandle,
}

impl SqliteCache {
    /// Create new SQLite cache
    pub async fn new(db_path: &str) -> Result<Self> {
        let db = SqliteHandle::open(db_path).await?;

        db.call(|conn| {
            conn.execute(
                "CREATE TABLE IF NOT EXISTS cache_entries (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    cached_at TEXT NOT NULL,
                    expires_at INTEGER NOT NULL
                )",
                [],
            )?;

            conn.execute(
                "CREATE INDEX IF NOT EXISTS idx_cache_expires_at ON cache_entries(expires_at)",
                [],
            )?;
            Ok(())
        })
        .await?;

        Ok(Self { db })
    }

    async fn try_get(&self, key: &str) -> Result<Option<CachedValue>> {
        let key = key.to_string();
        let now = Utc::now().timestamp_millis();

        let json: Option<String> = self
            .db
            .call(move |conn| {
                Ok(conn
                    .query_row(
                        "SELECT value FROM cache_entries WHERE key = ?1 AND expires_at > ?2",
                        params![key, now],
                        |row| row.get(0),
                    )
                    .optional()?)
            })
            .await?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn try_set(&self, key: &str, value: &CachedValue, ttl: Duration) -> Result<()> {
        let key = key.to_string();
        let json = serde_json::to_string(value)?;
        let now = Utc::now();
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = now.timestamp_millis().saturating_add(ttl_ms);

        self.db
            .call(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO cache_entries (key, value, cached_at, expires_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![key, json, now.to_rfc3339(), expires_at],
                )?;
                Ok(())
            })
            .await
    }

    /// Delete expired entries, returning how many were removed
    pub async fn purge_expired(&self) -> Result<u64> {
        let now = Utc::now().timestamp_millis();
        let deleted = self
            .db
            .call(move |conn| {
                Ok(conn.execute(
                    "DELETE FROM cache_entries WHERE expires_at <= ?1",
                    params![now],
                )?)
            })
            .await?;

        Ok(deleted as u64)
    }

    /// Get cache statistics
    pub async fn stats(&self) -> Result<CacheStats> {
        let now = Utc::now().timestamp_millis();

        let (total_entries, live_entries, oldest, newest) = self
            .db
            .call(move |conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*),
                            COALESCE(SUM(CASE WHEN expires_at > ?1 THEN 1 ELSE 0 END), 0),
                            MIN(cached_at),
                            MAX(cached_at)
                     FROM cache_entries",
                    params![now],
                    |row| {
                        Ok((
                            row.get::<_, u64>(0)?,
                            row.get::<_, u64>(1)?,
                            row.get::<_, Option<String>>(2)?,
                            row.get::<_, Option<String>>(3)?,
                        ))
                    },
                )?)
            })
            .await?;

        Ok(CacheStats {
            total_entries,
            live_entries,
            oldest_entry: oldest.as_deref().and_then(parse_timestamp),
            newest_entry: newest.as_deref().and_then(parse_timestamp),
        })
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[async_trait]
impl GameCache for SqliteCache {
    async fn get(&self, key: &str) -> Option<CachedValue> {
        match self.try_get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("⚠️ Cache read failed for '{}', treating as miss: {}", key, e);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: CachedValue, ttl: Duration) {
        if let Err(e) = self.try_set(key, &value, ttl).await {
            tracing::warn!("⚠️ Failed to save '{}' to cache: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GamePage, NewGame};

    fn game(slug: &str) -> CachedValue {
        CachedValue::Game(NewGame::new(slug, slug).into_game("1", Utc::now()))
    }

    #[tokio::test]
    async fn test_cache_create() {
        let cache = SqliteCache::new(":memory:").await.unwrap();
        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.total_entries, 0);
        assert!(stats.oldest_entry.is_none());
    }

    #[tokio::test]
    async fn test_cache_set_and_get() {
        let cache = SqliteCache::new(":memory:").await.unwrap();

        let value = game("cs2");
        cache.set("game:cs2", value.clone(), Duration::from_secs(60)).await;
        cache
            .set("games:cs", CachedValue::Page(GamePage::empty()), Duration::from_secs(60))
            .await;

        assert_eq!(cache.get("game:cs2").await, Some(value));
        assert_eq!(
            cache.get("games:cs").await,
            Some(CachedValue::Page(GamePage::empty()))
        );
        assert!(cache.get("game:missing").await.is_none());
    }

    #[tokio::test]
    async fn test_cache_expired_entry_is_a_miss() {
        let cache = SqliteCache::new(":memory:").await.unwrap();

        cache.set("game:old", game("old"), Duration::ZERO).await;
        assert!(cache.get("game:old").await.is_none());

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.live_entries, 0);
    }

    #[tokio::test]
    async fn test_cache_purge_expired() {
        let cache = SqliteCache::new(":memory:").await.unwrap();

        cache.set("game:old", game("old"), Duration::ZERO).await;
        cache.set("game:new", game("new"), Duration::from_secs(60)).await;

        let deleted = cache.purge_expired().await.unwrap();
        assert_eq!(deleted, 1);

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.total_entries, 1);
        assert!(stats.newest_entry.is_some());
    }

    #[tokio::test]
    async fn test_cache_failure_degrades_to_miss() {
        let cache = SqliteCache::new(":memory:").await.unwrap();
        cache.set("game:a", game("a"), Duration::from_secs(60)).await;

        cache
            .db
            .call(|conn| Ok(conn.execute("DROP TABLE cache_entries", [])?))
            .await
            .unwrap();

        // Neither call panics or errors
        assert!(cache.get("game:a").await.is_none());
        cache.set("game:b", game("b"), Duration::from_secs(60)).await;
    }
}
