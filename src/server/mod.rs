//! HTTP surface: routing, request validation and error mapping around
//! [`ResolutionEngine`].

pub mod auth;

use std::sync::Arc;
use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::core::{Game, GamePage, ListFilters};
use crate::engine::ResolutionEngine;
use crate::error::ResolveError;

pub use auth::{ApiTokens, Caller};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ResolutionEngine>,
    pub tokens: Arc<ApiTokens>,
}

impl AppState {
    pub fn new(engine: ResolutionEngine, tokens: ApiTokens) -> Self {
        Self {
            engine: Arc::new(engine),
            tokens: Arc::new(tokens),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/games/search", get(search_handler))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.tokens),
            auth::require_bearer,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .route("/games", get(list_handler))
        .merge(protected)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}

async fn search_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Game>, AppError> {
    let title = params
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("title must not be empty".to_string()))?;

    tracing::debug!("Search request from {}: {:?}", caller.name, title);

    let game = state.engine.resolve_single(title).await?;
    Ok(Json(game))
}

async fn list_handler(
    State(state): State<AppState>,
    Query(filters): Query<ListFilters>,
) -> Result<Json<GamePage>, AppError> {
    tracing::debug!("List request: {:?}", filters);

    let page = state.engine.resolve_list(&filters).await?;
    Ok(Json(page))
}

// Error handling
pub enum AppError {
    Resolve(ResolveError),
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Resolve(ResolveError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "Game not found".to_string())
            }
            AppError::Resolve(ResolveError::Upstream(cause)) => {
                tracing::error!("❌ Upstream failure: {}", cause);
                (StatusCode::INTERNAL_SERVER_ERROR, "Error fetching game data".to_string())
            }
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        AppError::Resolve(err)
    }
}
