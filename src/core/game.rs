use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Canonical game record, as persisted by the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Game {
    /// Opaque identifier assigned by the store
    pub id: String,

    /// Natural key, unique across all records
    pub slug: String,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Release date (YYYY-MM-DD)
    #[serde(default)]
    pub released: Option<NaiveDate>,

    /// Cover image URL
    #[serde(default)]
    pub cover_image: Option<String>,

    /// Average user rating
    #[serde(default)]
    pub rating: f64,

    /// Maximum possible rating
    #[serde(default)]
    pub rating_top: i32,

    /// Metacritic score (0-100)
    #[serde(default)]
    pub metacritic: Option<i32>,

    /// Average playtime in hours
    #[serde(default)]
    pub playtime: i32,

    #[serde(default)]
    pub platforms: Vec<String>,

    #[serde(default)]
    pub stores: Vec<String>,

    /// When the store created this record
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Game {
    /// Check platform membership (exact name match)
    pub fn is_on_platform(&self, platform: &str) -> bool {
        self.platforms.iter().any(|p| p == platform)
    }

    /// Get display name (for logging/UI)
    pub fn display_name(&self) -> String {
        match self.released {
            Some(date) => format!("{} ({})", self.name, date.format("%Y")),
            None => self.name.clone(),
        }
    }
}

/// Attributes for a record that does not exist yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewGame {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub released: Option<NaiveDate>,
    pub cover_image: Option<String>,
    pub rating: f64,
    pub rating_top: i32,
    pub metacritic: Option<i32>,
    pub playtime: i32,
    pub platforms: Vec<String>,
    pub stores: Vec<String>,
}

impl NewGame {
    /// Create attributes with the required fields; everything else empty
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            description: None,
            released: None,
            cover_image: None,
            rating: 0.0,
            rating_top: 0,
            metacritic: None,
            playtime: 0,
            platforms: Vec::new(),
            stores: Vec::new(),
        }
    }

    /// Promote to a full record with store-assigned identity
    pub fn into_game(self, id: impl Into<String>, created_at: DateTime<Utc>) -> Game {
        Game {
            id: id.into(),
            slug: self.slug,
            name: self.name,
            description: self.description,
            released: self.released,
            cover_image: self.cover_image,
            rating: self.rating,
            rating_top: self.rating_top,
            metacritic: self.metacritic,
            playtime: self.playtime,
            platforms: self.platforms,
            stores: self.stores,
            created_at,
        }
    }
}
