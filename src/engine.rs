use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::cache::{self, CachedValue, GameCache, MemoryCache, SqliteCache};
use crate::config::{AppConfig, CacheBackend};
use crate::core::{Game, GamePage, ListFilters, PageRequest};
use crate::error::{CatalogError, ResolveError, Result};
use crate::providers::{CatalogProvider, CatalogRecord, RawgProvider};
use crate::store::{GameFilter, GameOrder, GameStore, SqliteStore};

/// Resolution engine configuration
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Lifetime of cache entries written by the engine
    pub cache_ttl: Duration,
    /// Maximum concurrent find-or-create tasks per title search
    pub list_concurrency: usize,
    /// Path used when synthesizing next/previous links
    pub link_base: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            cache_ttl: cache::DEFAULT_TTL,
            list_concurrency: 8,
            link_base: "/games".to_string(),
        }
    }
}

/// Resolves game queries through cache, store and catalog provider.
///
/// Holds no mutable state of its own: every call is independent, and the
/// store's unique slug constraint is the only synchronization between
/// concurrent resolutions of the same game.
pub struct ResolutionEngine {
    cache: Arc<dyn GameCache>,
    store: Arc<dyn GameStore>,
    provider: Arc<dyn CatalogProvider>,
    options: EngineOptions,
}

impl ResolutionEngine {
    pub fn new(
        cache: Arc<dyn GameCache>,
        store: Arc<dyn GameStore>,
        provider: Arc<dyn CatalogProvider>,
    ) -> Self {
        Self {
            cache,
            store,
            provider,
            options: EngineOptions::default(),
        }
    }

    /// Build the default stack from configuration: SQLite store, the
    /// configured cache tier and the RAWG provider
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let store = Arc::new(SqliteStore::new(&config.db_path).await?);

        let cache: Arc<dyn GameCache> = match config.cache_backend {
            CacheBackend::Memory => Arc::new(MemoryCache::new(config.cache_capacity)),
            CacheBackend::Sqlite => Arc::new(SqliteCache::new(&config.db_path).await?),
        };

        if config.rawg_api_key.is_empty() {
            tracing::warn!("⚠️ RAWG_API_KEY not set, provider lookups will be rejected upstream");
        }
        let provider = Arc::new(RawgProvider::new(
            config.rawg_api_key.clone(),
            config.rawg_base_url.clone(),
            config.provider_timeout,
        )?);

        tracing::info!("📦 Database: {}", config.db_path);
        tracing::info!("🗃️ Cache backend: {:?}", config.cache_backend);

        Ok(Self::new(cache, store, provider).with_options(config.engine_options()))
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Resolve a single game by title (cache, then provider + store)
    pub async fn resolve_single(&self, title: &str) -> std::result::Result<Game, ResolveError> {
        let key = cache::game_key(title);

        if let Some(game) = self.cache.get(&key).await.and_then(CachedValue::into_game) {
            tracing::debug!("Cache hit for '{}' → {}", title, game.slug);
            return Ok(game);
        }

        let record = self
            .provider
            .search_best(title)
            .await?
            .ok_or_else(|| ResolveError::NotFound(title.to_string()))?;

        let game = find_or_create(self.store.as_ref(), &record).await?;

        self.cache
            .set(&key, CachedValue::Game(game.clone()), self.options.cache_ttl)
            .await;

        tracing::info!("✅ {} → {}", title, game.display_name());
        Ok(game)
    }

    /// Resolve a list: provider search when a title is given, store listing otherwise
    pub async fn resolve_list(&self, filters: &ListFilters) -> std::result::Result<GamePage, ResolveError> {
        let page = match filters.title() {
            Some(title) => self.search_list(title).await?,
            None => self.browse(filters).await?,
        };
        Ok(page)
    }

    async fn search_list(&self, title: &str) -> Result<GamePage> {
        let key = cache::search_key(title);

        if let Some(page) = self.cache.get(&key).await.and_then(CachedValue::into_page) {
            tracing::debug!("Cache hit for search '{}' ({} results)", title, page.results.len());
            return Ok(page);
        }

        let page = self.provider.search_many(title).await?;
        let results = self.find_or_create_all(page.results).await?;

        let assembled = GamePage {
            count: page.count,
            results,
            next: page.next,
            previous: page.previous,
        };

        self.cache
            .set(&key, CachedValue::Page(assembled.clone()), self.options.cache_ttl)
            .await;

        Ok(assembled)
    }

    async fn browse(&self, filters: &ListFilters) -> Result<GamePage> {
        let request = PageRequest::from_raw(filters.page.as_deref(), filters.limit.as_deref());
        let platform = filters.platform();
        let filter = GameFilter {
            platform: platform.map(str::to_string),
        };

        let (results, total) = self
            .store
            .find_many(&filter, request.skip(), request.take(), GameOrder::RatingDesc)
            .await?;

        let base = &self.options.link_base;
        let next = request
            .has_next(total)
            .then(|| request.link(base, request.page + 1, platform));
        let previous = request
            .has_previous()
            .then(|| request.link(base, request.page - 1, platform));

        Ok(GamePage {
            count: total,
            results,
            next,
            previous,
        })
    }

    /// Find-or-create every record concurrently (bounded), keeping input order
    async fn find_or_create_all(&self, records: Vec<CatalogRecord>) -> Result<Vec<Game>> {
        let semaphore = Arc::new(Semaphore::new(self.options.list_concurrency.max(1)));
        let mut join_set = JoinSet::new();
        let total = records.len();

        for (idx, record) in records.into_iter().enumerate() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| CatalogError::Task(e.to_string()))?;
            let store = Arc::clone(&self.store);

            join_set.spawn(async move {
                let _permit = permit;
                (idx, find_or_create(store.as_ref(), &record).await)
            });
        }

        let mut slots: Vec<Option<Game>> = vec![None; total];
        while let Some(joined) = join_set.join_next().await {
            let (idx, result) = joined?;
            slots[idx] = Some(result?);
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

/// Return the stored record for the record's slug, creating it if absent.
///
/// A concurrent insert of the same slug surfaces as `DuplicateSlug`; the
/// winner's record is re-read and returned instead.
pub(crate) async fn find_or_create(store: &dyn GameStore, record: &CatalogRecord) -> Result<Game> {
    let slug = record.derived_slug();
    if slug.is_empty() {
        return Err(CatalogError::Other(format!(
            "Catalog record {} ('{}') has no slug",
            record.id, record.name
        )));
    }

    if let Some(existing) = store.find_by_slug(&slug).await? {
        return Ok(existing);
    }

    match store.create(record.to_new_game()).await {
        Ok(game) => {
            tracing::info!("💾 Stored new game '{}'", game.slug);
            Ok(game)
        }
        Err(CatalogError::DuplicateSlug(slug)) => {
            tracing::warn!("⚠️ Concurrent insert for '{}', re-reading stored record", slug);
            store.find_by_slug(&slug).await?.ok_or_else(|| {
                CatalogError::Other(format!("Game '{}' missing after duplicate insert", slug))
            })
        }
        Err(e) => Err(e),
    }
}
