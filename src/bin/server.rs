use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use game_catalog_engine::{
    server::{self, ApiTokens, AppState},
    AppConfig, ResolutionEngine,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "game_catalog_server=debug,game_catalog_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    tracing::info!("🚀 Starting Game Catalog Server");
    tracing::info!("🔌 Port: {}", config.port);

    let engine = ResolutionEngine::from_config(&config).await?;

    let tokens = ApiTokens::new(config.api_tokens.clone());
    if !tokens.is_enabled() {
        tracing::warn!("⚠️ API_TOKENS not set, /games/search accepts unauthenticated requests");
    }

    let app = server::router(AppState::new(engine, tokens));

    let addr = config.bind_addr();
    tracing::info!("🎮 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
