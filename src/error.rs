use thiserror::Error;

/// Internal error type shared by the cache, store and provider tiers
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// HTTP request errors
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider errors
    #[error("Provider '{provider}' error: {message}")]
    Provider { provider: String, message: String },

    /// A record with this slug already exists
    #[error("Game with slug '{0}' already exists")]
    DuplicateSlug(String),

    /// Blocking task join failures and poisoned locks
    #[error("Task error: {0}")]
    Task(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl CatalogError {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        CatalogError::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

impl From<tokio::task::JoinError> for CatalogError {
    fn from(e: tokio::task::JoinError) -> Self {
        CatalogError::Task(e.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Failure surfaced by the resolution engine.
///
/// Only "no match" is distinguished; every other cause is collapsed into
/// `Upstream` after being logged, so clients never see store or transport detail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The provider had no candidate for the title
    #[error("No game found for title: {0}")]
    NotFound(String),

    /// Provider transport failure or any other unexpected failure
    #[error("Upstream failure: {0}")]
    Upstream(String),
}

impl From<CatalogError> for ResolveError {
    fn from(err: CatalogError) -> Self {
        tracing::error!("❌ Resolution failed: {}", err);
        ResolveError::Upstream(err.to_string())
    }
}
