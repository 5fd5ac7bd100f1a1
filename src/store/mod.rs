pub mod sqlite;

use async_trait::async_trait;
use crate::core::{Game, NewGame};
use crate::error::Result;

pub use sqlite::SqliteStore;

/// Trait for the persistent store of canonical game records.
///
/// `slug` is unique; `create` reports a violation as
/// [`CatalogError::DuplicateSlug`](crate::error::CatalogError::DuplicateSlug)
/// so callers can recover from a concurrent insert.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Point lookup by natural key
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Game>>;

    /// Filtered, ordered page of records plus the total number of matches
    async fn find_many(
        &self,
        filter: &GameFilter,
        skip: u64,
        take: u64,
        order: GameOrder,
    ) -> Result<(Vec<Game>, u64)>;

    /// Insert a new record
    async fn create(&self, attrs: NewGame) -> Result<Game>;

    /// Total number of records
    async fn count(&self) -> Result<u64>;
}

/// Listing filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameFilter {
    /// Only records whose platform set contains this name
    pub platform: Option<String>,
}

impl GameFilter {
    pub fn platform(platform: impl Into<String>) -> Self {
        Self {
            platform: Some(platform.into()),
        }
    }
}

/// Listing order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GameOrder {
    /// Highest rating first, ties broken by slug
    #[default]
    RatingDesc,
}

impl GameOrder {
    pub(crate) fn sql(self) -> &'static str {
        match self {
            GameOrder::RatingDesc => "rating DESC, slug ASC",
        }
    }
}
