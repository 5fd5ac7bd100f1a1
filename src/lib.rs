//! # Game Catalog Engine
//!
//! Game metadata resolution with:
//! - Cache-aside lookups (moka in-process or SQLite cache tier)
//! - SQLite game store, deduplicated by slug
//! - RAWG catalog provider
//! - Async/await architecture
//! - Interfaces: Rust library, HTTP API, CLI
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use game_catalog_engine::{AppConfig, ResolutionEngine};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let engine = ResolutionEngine::from_config(&config).await?;
//!
//!     let game = engine.resolve_single("the witcher 3").await?;
//!     println!("Found: {} ({} / {})", game.name, game.rating, game.rating_top);
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod cache;
pub mod store;
pub mod providers;
pub mod engine;
pub mod config;
pub mod error;
mod db;

#[cfg(feature = "server")]
pub mod server;

// Re-export primary types
pub use crate::core::{Game, GamePage, ListFilters, NewGame, PageRequest};
pub use engine::{EngineOptions, ResolutionEngine};
pub use config::AppConfig;
pub use error::{CatalogError, ResolveError, Result};
pub use cache::GameCache;
pub use store::GameStore;
pub use providers::CatalogProvider;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
