//! Catalog wire records and their mapping into [`NewGame`].
//!
//! Only the fields the engine consumes are declared; everything is lenient
//! (`#[serde(default)]`) so schema drift on the provider side does not break
//! parsing of the fields we do use.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::NewGame;

/// Game record as returned by search results and the detail endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogRecord {
    pub id: u64,
    pub slug: String,
    pub name: String,
    /// Plain-text description (detail endpoint only)
    #[serde(default)]
    pub description_raw: Option<String>,
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub rating_top: Option<i32>,
    #[serde(default)]
    pub metacritic: Option<i32>,
    #[serde(default)]
    pub playtime: Option<i32>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub platforms: Vec<PlatformEntry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub stores: Vec<StoreEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlatformEntry {
    pub platform: NamedRef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreEntry {
    pub store: NamedRef,
}

/// Nested `{id, name, slug}` reference
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NamedRef {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// One page of search results
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogPage {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<CatalogRecord>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl CatalogRecord {
    /// Natural key for dedup
    pub fn derived_slug(&self) -> String {
        self.slug.trim().to_lowercase()
    }

    /// Map into canonical attributes, flattening nested platform/store names
    pub fn to_new_game(&self) -> NewGame {
        let mut attrs = NewGame::new(self.derived_slug(), self.name.clone());
        attrs.description = self
            .description_raw
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        attrs.released = self
            .released
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
        attrs.cover_image = self.background_image.clone().filter(|url| !url.is_empty());
        attrs.rating = self.rating.unwrap_or(0.0);
        attrs.rating_top = self.rating_top.unwrap_or(0);
        attrs.metacritic = self.metacritic;
        attrs.playtime = self.playtime.unwrap_or(0);
        attrs.platforms = dedup_names(self.platforms.iter().map(|p| &p.platform.name));
        attrs.stores = dedup_names(self.stores.iter().map(|s| &s.store.name));
        attrs
    }
}

fn dedup_names<'a>(names: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !name.is_empty() && !out.contains(name) {
            out.push(name.clone());
        }
    }
    out
}
