//! Environment-driven configuration.
//!
//! Every setting has a default so a bare `game-catalog-server` starts; only
//! `RAWG_API_KEY` is needed for provider lookups to succeed.

use std::str::FromStr;
use std::time::Duration;

use crate::engine::EngineOptions;
use crate::error::{CatalogError, Result};
use crate::providers::rawg;

/// Which cache tier implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    /// In-process moka cache
    Memory,
    /// SQLite table next to the game store
    Sqlite,
}

impl FromStr for CacheBackend {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(CacheBackend::Memory),
            "sqlite" => Ok(CacheBackend::Sqlite),
            other => Err(CatalogError::Config(format!(
                "CACHE_BACKEND must be 'memory' or 'sqlite', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub rawg_api_key: String,
    pub rawg_base_url: String,
    pub provider_timeout: Duration,
    pub cache_backend: CacheBackend,
    pub cache_ttl: Duration,
    pub cache_capacity: u64,
    pub list_concurrency: usize,
    /// `(caller name, token)` pairs accepted by the bearer check
    pub api_tokens: Vec<(String, String)>,
}

impl AppConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 8090;
    const DEFAULT_DB_PATH: &'static str = "games.db";
    const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;
    const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
    const DEFAULT_CACHE_CAPACITY: u64 = 10_000;
    const DEFAULT_LIST_CONCURRENCY: usize = 8;

    /// Load from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let config = Self {
            host: get("GAMES_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string()),
            port: parse_or(get("PORT"), "PORT", Self::DEFAULT_PORT)?,
            db_path: get("DB_PATH").unwrap_or_else(|| Self::DEFAULT_DB_PATH.to_string()),
            rawg_api_key: get("RAWG_API_KEY").unwrap_or_default(),
            rawg_base_url: get("RAWG_BASE_URL").unwrap_or_else(|| rawg::DEFAULT_BASE_URL.to_string()),
            provider_timeout: Duration::from_secs(parse_or(
                get("PROVIDER_TIMEOUT_SECS"),
                "PROVIDER_TIMEOUT_SECS",
                Self::DEFAULT_PROVIDER_TIMEOUT_SECS,
            )?),
            cache_backend: match get("CACHE_BACKEND") {
                Some(value) => value.parse()?,
                None => CacheBackend::Memory,
            },
            cache_ttl: Duration::from_secs(parse_or(
                get("CACHE_TTL_SECS"),
                "CACHE_TTL_SECS",
                Self::DEFAULT_CACHE_TTL_SECS,
            )?),
            cache_capacity: parse_or(get("CACHE_CAPACITY"), "CACHE_CAPACITY", Self::DEFAULT_CACHE_CAPACITY)?,
            list_concurrency: parse_or(
                get("LIST_CONCURRENCY"),
                "LIST_CONCURRENCY",
                Self::DEFAULT_LIST_CONCURRENCY,
            )?,
            api_tokens: parse_tokens(get("API_TOKENS").as_deref())?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.cache_ttl.is_zero() {
            return Err(CatalogError::Config("CACHE_TTL_SECS must be positive".into()));
        }
        if self.provider_timeout.is_zero() {
            return Err(CatalogError::Config("PROVIDER_TIMEOUT_SECS must be positive".into()));
        }
        if self.list_concurrency == 0 {
            return Err(CatalogError::Config("LIST_CONCURRENCY must be positive".into()));
        }
        if self.cache_capacity == 0 {
            return Err(CatalogError::Config("CACHE_CAPACITY must be positive".into()));
        }
        Ok(())
    }

    /// Address to bind the HTTP server to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            cache_ttl: self.cache_ttl,
            list_concurrency: self.list_concurrency,
            ..EngineOptions::default()
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T> {
    match value {
        Some(raw) => raw
            .parse()
            .map_err(|_| CatalogError::Config(format!("{} has invalid value '{}'", key, raw))),
        None => Ok(default),
    }
}

/// Parse `name:token,name:token`
fn parse_tokens(raw: Option<&str>) -> Result<Vec<(String, String)>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((name, token)) if !name.trim().is_empty() && !token.trim().is_empty() => {
                Ok((name.trim().to_string(), token.trim().to_string()))
            }
            _ => Err(CatalogError::Config(
                "API_TOKENS entries must look like name:token".into(),
            )),
        })
        .collect()
}
