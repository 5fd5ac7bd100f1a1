use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{CatalogError, Result};
use crate::providers::{CatalogPage, CatalogProvider, CatalogRecord};

pub const DEFAULT_BASE_URL: &str = "https://api.rawg.io/api";

/// RAWG catalog API provider
pub struct RawgProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RawgProvider {
    /// Create new RAWG provider; every request is bounded by `timeout`
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn search_url(&self, title: &str) -> String {
        format!(
            "{}/games?search={}&key={}",
            self.base_url,
            urlencoding::encode(title),
            urlencoding::encode(&self.api_key)
        )
    }

    fn detail_url(&self, id: u64) -> String {
        format!(
            "{}/games/{}?key={}",
            self.base_url,
            id,
            urlencoding::encode(&self.api_key)
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let response = self.client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::provider("rawg", format!("{} request failed: {}", what, e.without_url())))?;

        if !response.status().is_success() {
            return Err(CatalogError::provider(
                "rawg",
                format!("{} returned HTTP {}", what, response.status()),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::provider("rawg", format!("Invalid {} JSON: {}", what, e.without_url())))
    }

    /// Get full detail record by provider id
    pub async fn get_details(&self, id: u64) -> Result<CatalogRecord> {
        self.get_json(&self.detail_url(id), "Details").await
    }
}

#[async_trait]
impl CatalogProvider for RawgProvider {
    async fn search_best(&self, title: &str) -> Result<Option<CatalogRecord>> {
        let page = self.search_many(title).await?;

        let Some(top) = page.results.into_iter().next() else {
            tracing::debug!("RAWG has no match for '{}'", title);
            return Ok(None);
        };

        tracing::debug!("RAWG best match for '{}': {} (#{})", title, top.slug, top.id);
        self.get_details(top.id).await.map(Some)
    }

    async fn search_many(&self, title: &str) -> Result<CatalogPage> {
        let page: CatalogPage = self.get_json(&self.search_url(title), "Search").await?;
        tracing::debug!("RAWG search '{}' returned {} of {} results", title, page.results.len(), page.count);
        Ok(page)
    }

    fn name(&self) -> &str {
        "rawg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base: &str) -> RawgProvider {
        RawgProvider::new("secret key", base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_urls_encode_parameters() {
        let rawg = provider("https://api.rawg.io/api/");
        assert_eq!(
            rawg.search_url("The Witcher 3"),
            "https://api.rawg.io/api/games?search=The%20Witcher%203&key=secret%20key"
        );
        assert_eq!(rawg.detail_url(3328), "https://api.rawg.io/api/games/3328?key=secret%20key");
    }

    #[cfg(feature = "server")]
    mod http {
        use super::*;
        use axum::{extract::{Path, Query}, http::StatusCode, routing::get, Json, Router};
        use serde_json::{json, Value};
        use std::collections::HashMap;

        async fn search(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
            let results = if q.get("search").map(String::as_str) == Some("Test Game") {
                json!([{ "id": 123, "slug": "test-game", "name": "Test Game" }])
            } else {
                json!([])
            };
            let count = results.as_array().map(Vec::len).unwrap_or(0);
            Json(json!({ "count": count, "next": null, "previous": null, "results": results }))
        }

        async fn details(Path(id): Path<u64>) -> std::result::Result<Json<Value>, StatusCode> {
            if id != 123 {
                return Err(StatusCode::NOT_FOUND);
            }
            Ok(Json(json!({
                "id": 123,
                "slug": "test-game",
                "name": "Test Game",
                "description_raw": "Test Description",
                "platforms": [{ "platform": { "id": 4, "name": "PC", "slug": "pc" } }],
                "stores": []
            })))
        }

        async fn spawn_stub(router: Router) -> String {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, router).await.unwrap();
            });
            format!("http://{}", addr)
        }

        fn stub_router() -> Router {
            Router::new()
                .route("/games", get(search))
                .route("/games/:id", get(details))
        }

        #[tokio::test]
        async fn test_search_best_fetches_details() {
            let base = spawn_stub(stub_router()).await;
            let record = provider(&base).search_best("Test Game").await.unwrap().unwrap();

            assert_eq!(record.slug, "test-game");
            assert_eq!(record.description_raw.as_deref(), Some("Test Description"));
            assert_eq!(record.platforms[0].platform.name, "PC");
        }

        #[tokio::test]
        async fn test_search_best_without_match_is_none() {
            let base = spawn_stub(stub_router()).await;
            assert!(provider(&base).search_best("Nothing").await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_http_error_is_provider_error() {
            let router = Router::new().route("/games", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
            let base = spawn_stub(router).await;

            let err = provider(&base).search_many("anything").await.unwrap_err();
            assert!(matches!(err, CatalogError::Provider { ref provider, .. } if provider == "rawg"));
        }

        #[tokio::test]
        async fn test_invalid_json_is_provider_error() {
            let router = Router::new().route("/games", get(|| async { "not json" }));
            let base = spawn_stub(router).await;

            assert!(provider(&base).search_many("anything").await.is_err());
        }
    }

    #[tokio::test]
    #[ignore] // Requires network access and RAWG_API_KEY
    async fn test_rawg_search_live() {
        let key = std::env::var("RAWG_API_KEY").unwrap();
        let rawg = RawgProvider::new(key, DEFAULT_BASE_URL, Duration::from_secs(10)).unwrap();
        let page = rawg.search_many("the witcher 3").await.unwrap();

        assert!(!page.results.is_empty());
        assert!(page.results.iter().any(|g| g.slug.contains("witcher")));
    }
}
