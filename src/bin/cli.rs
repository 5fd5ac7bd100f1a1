use clap::{Parser, Subcommand};
use game_catalog_engine::{
    cache::SqliteCache, store::SqliteStore, AppConfig, GameStore, ListFilters, ResolutionEngine,
};

#[derive(Parser)]
#[command(name = "game-catalog-cli")]
#[command(about = "Game Catalog Engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database path (overrides DB_PATH)
    #[arg(short, long)]
    db: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a single game by title
    Search {
        /// Game title
        title: String,
    },

    /// List games: provider search with --title, stored games otherwise
    List {
        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        platform: Option<String>,

        #[arg(long)]
        page: Option<String>,

        #[arg(short, long)]
        limit: Option<String>,
    },

    /// Get SQLite cache statistics and the stored game count
    CacheStats,

    /// Delete expired SQLite cache entries
    CachePurge,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    match cli.command {
        Commands::Search { title } => {
            let engine = ResolutionEngine::from_config(&config).await?;
            println!("🔍 Searching for: {}", title);

            let game = engine.resolve_single(&title).await?;

            println!("\n✅ Found: {}", game.display_name());
            println!("   Slug: {}", game.slug);
            println!("   Rating: {:.2} / {}", game.rating, game.rating_top);
            println!(
                "   Metacritic: {}",
                game.metacritic.map(|m| m.to_string()).unwrap_or_else(|| "N/A".to_string())
            );
            println!("   Platforms: {}", game.platforms.join(", "));
            println!("   Stores: {}", game.stores.join(", "));
        }

        Commands::List { title, platform, page, limit } => {
            let engine = ResolutionEngine::from_config(&config).await?;
            let filters = ListFilters { title, platform, page, limit };

            let page = engine.resolve_list(&filters).await?;

            println!("📋 {} games", page.count);
            for (i, game) in page.results.iter().enumerate() {
                println!("   {}. {} [{:.2}]", i + 1, game.display_name(), game.rating);
            }
            if let Some(next) = page.next {
                println!("   next: {}", next);
            }
            if let Some(previous) = page.previous {
                println!("   previous: {}", previous);
            }
        }

        Commands::CacheStats => {
            let cache = SqliteCache::new(&config.db_path).await?;
            let stats = cache.stats().await?;
            let stored = SqliteStore::new(&config.db_path).await?.count().await?;

            println!("📊 Cache Statistics:");
            println!("   Stored games: {}", stored);
            println!("   Total entries: {}", stats.total_entries);
            println!("   Live entries: {}", stats.live_entries);

            if let Some(oldest) = stats.oldest_entry {
                println!("   Oldest entry: {}", oldest.format("%Y-%m-%d %H:%M:%S"));
            }

            if let Some(newest) = stats.newest_entry {
                println!("   Newest entry: {}", newest.format("%Y-%m-%d %H:%M:%S"));
            }
        }

        Commands::CachePurge => {
            println!("🧹 Purging expired cache entries...");

            let cache = SqliteCache::new(&config.db_path).await?;
            let deleted = cache.purge_expired().await?;

            println!("✅ Deleted {} entries", deleted);
        }
    }

    Ok(())
}
