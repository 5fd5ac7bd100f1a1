pub mod rawg;
pub mod record;

use async_trait::async_trait;
use crate::error::Result;

pub use rawg::RawgProvider;
pub use record::{CatalogPage, CatalogRecord};

/// Trait for external game catalogs (RAWG and compatible APIs)
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Best match for a title: top search hit, then its full detail record.
    /// `Ok(None)` when nothing matches.
    async fn search_best(&self, title: &str) -> Result<Option<CatalogRecord>>;

    /// One page of search results; an empty page when nothing matches
    async fn search_many(&self, title: &str) -> Result<CatalogPage>;

    /// Get provider name
    fn name(&self) -> &str;
}
