use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use uuid::Uuid;

use crate::core::{Game, NewGame};
use crate::db::SqliteHandle;
use crate::error::{CatalogError, Result};
use crate::store::{GameFilter, GameOrder, GameStore};

const COLUMNS: &str = "id, slug, name, description, released, cover_image, rating, rating_top,
                       metacritic, playtime, platforms, stores, created_at";

/// SQLite-backed game store.
///
/// Schema:
/// ```sql
/// CREATE TABLE games (
///     id TEXT PRIMARY KEY,
///     slug TEXT NOT NULL UNIQUE,
///     name TEXT NOT NULL,
///     description TEXT,
///     released TEXT,          -- YYYY-MM-DD
///     cover_image TEXT,
///     rating REAL NOT NULL,
///     rating_top INTEGER NOT NULL,
///     metacritic INTEGER,
///     playtime INTEGER NOT NULL,
///     platforms TEXT NOT NULL, -- JSON array of names
///     stores TEXT NOT NULL,    -- JSON array of names
///     created_at TEXT NOT NULL
/// );
/// ```
pub struct SqliteStore {
    db: SqliteHandle,
}

impl SqliteStore {
    /// Open the store, creating the schema if needed
    pub async fn new(db_path: &str) -> Result<Self> {
        let db = SqliteHandle::open(db_path).await?;

        db.call(|conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS games (
                    id TEXT PRIMARY KEY,
                    slug TEXT NOT NULL UNIQUE,
                    name TEXT NOT NULL,
                    description TEXT,
                    released TEXT,
                    cover_image TEXT,
                    rating REAL NOT NULL DEFAULT 0,
                    rating_top INTEGER NOT NULL DEFAULT 0,
                    metacritic INTEGER,
                    playtime INTEGER NOT NULL DEFAULT 0,
                    platforms TEXT NOT NULL DEFAULT '[]',
                    stores TEXT NOT NULL DEFAULT '[]',
                    created_at TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_games_rating ON games(rating DESC, slug);",
            )?;
            Ok(())
        })
        .await?;

        Ok(Self { db })
    }
}

fn json_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let json: String = row.get(idx)?;
    serde_json::from_str(&json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_game(row: &Row<'_>) -> rusqlite::Result<Game> {
    let released: Option<String> = row.get(4)?;
    let created_at: String = row.get(12)?;

    Ok(Game {
        id: row.get(0)?,
        slug: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        released: released.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        cover_image: row.get(5)?,
        rating: row.get(6)?,
        rating_top: row.get(7)?,
        metacritic: row.get(8)?,
        playtime: row.get(9)?,
        platforms: json_column(row, 10)?,
        stores: json_column(row, 11)?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(12, Type::Text, Box::new(e)))?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[async_trait]
impl GameStore for SqliteStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Game>> {
        let slug = slug.to_string();
        self.db
            .call(move |conn| {
                let sql = format!("SELECT {} FROM games WHERE slug = ?1", COLUMNS);
                Ok(conn.query_row(&sql, params![slug], row_to_game).optional()?)
            })
            .await
    }

    async fn find_many(
        &self,
        filter: &GameFilter,
        skip: u64,
        take: u64,
        order: GameOrder,
    ) -> Result<(Vec<Game>, u64)> {
        let platform = filter.platform.clone();

        self.db
            .call(move |conn| {
                let mut args: Vec<Value> = Vec::new();
                let where_clause = match platform {
                    Some(platform) => {
                        args.push(Value::Text(platform));
                        "WHERE EXISTS (SELECT 1 FROM json_each(games.platforms) WHERE json_each.value = ?1)"
                    }
                    None => "",
                };

                let total: u64 = conn.query_row(
                    &format!("SELECT COUNT(*) FROM games {}", where_clause),
                    params_from_iter(args.iter()),
                    |row| row.get(0),
                )?;

                let sql = format!(
                    "SELECT {} FROM games {} ORDER BY {} LIMIT ?{} OFFSET ?{}",
                    COLUMNS,
                    where_clause,
                    order.sql(),
                    args.len() + 1,
                    args.len() + 2,
                );
                args.push(Value::Integer(to_i64(take)));
                args.push(Value::Integer(to_i64(skip)));

                let mut stmt = conn.prepare(&sql)?;
                let games = stmt
                    .query_map(params_from_iter(args.iter()), row_to_game)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                Ok((games, total))
            })
            .await
    }

    async fn create(&self, attrs: NewGame) -> Result<Game> {
        let game = attrs.into_game(Uuid::new_v4().to_string(), Utc::now());
        let platforms = serde_json::to_string(&game.platforms)?;
        let stores = serde_json::to_string(&game.stores)?;

        self.db
            .call(move |conn| {
                let inserted = conn.execute(
                    &format!(
                        "INSERT INTO games ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                        COLUMNS
                    ),
                    params![
                        game.id,
                        game.slug,
                        game.name,
                        game.description,
                        game.released.map(|d| d.format("%Y-%m-%d").to_string()),
                        game.cover_image,
                        game.rating,
                        game.rating_top,
                        game.metacritic,
                        game.playtime,
                        platforms,
                        stores,
                        game.created_at.to_rfc3339(),
                    ],
                );

                match inserted {
                    Ok(_) => Ok(game),
                    Err(e) if is_unique_violation(&e) => Err(CatalogError::DuplicateSlug(game.slug)),
                    Err(e) => Err(e.into()),
                }
            })
            .await
    }

    async fn count(&self) -> Result<u64> {
        self.db
            .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?))
            .await
    }
}
