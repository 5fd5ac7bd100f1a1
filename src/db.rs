//! Shared SQLite connection handle.
//!
//! rusqlite is synchronous, so every call runs on tokio's blocking pool while
//! holding the connection lock; async worker threads never wait on disk I/O.

use std::sync::{Arc, Mutex};
use rusqlite::Connection;

use crate::error::{CatalogError, Result};

#[derive(Clone)]
pub(crate) struct SqliteHandle {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteHandle {
    /// Open (or create) the database at `db_path`; `:memory:` is supported
    pub async fn open(db_path: &str) -> Result<Self> {
        let path = db_path.to_string();
        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&path)?;
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA synchronous=NORMAL;
                 PRAGMA busy_timeout=5000;",
            )?;
            Ok::<_, CatalogError>(conn)
        })
        .await??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool
    pub async fn call<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| CatalogError::Task("SQLite connection lock poisoned".to_string()))?;
            f(&mut guard)
        })
        .await?
    }
}
