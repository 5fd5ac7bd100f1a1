use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use game_catalog_engine::cache::MemoryCache;
use game_catalog_engine::providers::{CatalogPage, CatalogProvider, CatalogRecord};
use game_catalog_engine::store::SqliteStore;
use game_catalog_engine::{CatalogError, ResolutionEngine, Result};
use serde_json::json;

/// Scripted catalog: fixed answers per title and call counting
#[derive(Default)]
pub struct ScriptedProvider {
    pub best: HashMap<String, CatalogRecord>,
    pub pages: HashMap<String, CatalogPage>,
    pub failing: bool,
    pub calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn with_best(mut self, title: &str, record: CatalogRecord) -> Self {
        self.best.insert(title.to_string(), record);
        self
    }

    pub fn with_page(mut self, title: &str, page: CatalogPage) -> Self {
        self.pages.insert(title.to_string(), page);
        self
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(CatalogError::provider("scripted", "connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogProvider for ScriptedProvider {
    async fn search_best(&self, title: &str) -> Result<Option<CatalogRecord>> {
        self.enter().await?;
        Ok(self.best.get(title).cloned())
    }

    async fn search_many(&self, title: &str) -> Result<CatalogPage> {
        self.enter().await?;
        Ok(self.pages.get(title).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// The record from the catalog's "Test Game" fixture
pub fn test_game_record() -> CatalogRecord {
    serde_json::from_value(json!({
        "id": 123,
        "slug": "test-game",
        "name": "Test Game",
        "description_raw": "Test Description",
        "released": "2024-01-01",
        "background_image": "test.jpg",
        "rating": 90,
        "rating_top": 100,
        "metacritic": 90,
        "playtime": 10,
        "platforms": [{ "platform": { "id": 1, "name": "PC", "slug": "pc" } }],
        "stores": [{ "store": { "id": 1, "name": "Steam", "slug": "steam" } }]
    }))
    .unwrap()
}

pub fn record(id: u64, slug: &str, rating: f64) -> CatalogRecord {
    CatalogRecord {
        id,
        slug: slug.to_string(),
        name: slug.replace('-', " "),
        rating: Some(rating),
        ..Default::default()
    }
}

pub struct Harness {
    pub engine: Arc<ResolutionEngine>,
    pub cache: Arc<MemoryCache>,
    pub store: Arc<SqliteStore>,
    pub provider: Arc<ScriptedProvider>,
}

pub async fn harness(provider: ScriptedProvider) -> Harness {
    let cache = Arc::new(MemoryCache::default());
    let store = Arc::new(SqliteStore::new(":memory:").await.unwrap());
    let provider = Arc::new(provider);

    let engine = ResolutionEngine::new(cache.clone(), store.clone(), provider.clone());

    Harness {
        engine: Arc::new(engine),
        cache,
        store,
        provider,
    }
}
