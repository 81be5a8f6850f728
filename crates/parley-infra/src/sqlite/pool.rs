//! Database pool with split reader/writer connections in WAL mode.
//!
//! SQLite allows only one writer at a time. `DatabasePool` pairs a
//! multi-connection read-only pool for history and status queries with a
//! single-connection writer pool, so every counter and subscription write is
//! serialized at the store.

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::debug;

/// File name of the database inside the data directory.
pub const DATABASE_FILE: &str = "parley.db";

/// Split read/write pool for SQLite with WAL mode.
///
/// - `reader`: Multi-connection pool (up to 8) for concurrent SELECT queries.
/// - `writer`: Single-connection pool for serialized INSERT/UPDATE/DELETE.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open (creating if missing) the database at `database_url` and bring
    /// its schema up to date.
    ///
    /// Both pools use WAL journal mode and a 5-second busy timeout.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let base_opts = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .create_if_missing(true);

        let read_opts = base_opts.clone().read_only(true);
        let write_opts = base_opts;

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(write_opts)
            .await?;

        // Schema must exist before the read-only pool opens
        init_schema(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(read_opts)
            .await?;

        Ok(Self { reader, writer })
    }

    /// Open `parley.db` inside `data_dir`.
    pub async fn open_in(data_dir: &Path) -> Result<Self, sqlx::Error> {
        Self::new(&database_url_in(data_dir)).await
    }

    pub async fn close(&self) {
        self.reader.close().await;
        self.writer.close().await;
    }
}

/// Run the embedded migrations. Idempotent.
///
/// The initial migration only creates missing tables, so a database left
/// behind by an older deployment keeps its data.
pub async fn init_schema(writer: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("../../migrations").run(writer).await?;
    debug!("Database schema up to date");
    Ok(())
}

/// SQLite URL for the database file inside `data_dir`.
pub fn database_url_in(data_dir: &Path) -> String {
    format!("sqlite://{}", data_dir.join(DATABASE_FILE).display())
}

/// Returns the default database URL under the Parley data directory
/// (`PARLEY_DATA_DIR`, falling back to `~/.parley`).
pub fn default_database_url() -> String {
    database_url_in(&crate::config::data_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pool_creates_tables() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::open_in(dir.path()).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(&pool.reader)
        .await
        .unwrap();

        let table_names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        assert_eq!(table_names, vec!["limits", "messages", "subscriptions"]);
    }

    #[tokio::test]
    async fn test_pool_wal_mode() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::open_in(dir.path()).await.unwrap();

        let result: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool.writer)
            .await
            .unwrap();

        assert_eq!(result.0.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::open_in(dir.path()).await.unwrap();
        sqlx::query("INSERT INTO limits (user_id, date, count) VALUES (1, '2024-03-02', 3)")
            .execute(&pool.writer)
            .await
            .unwrap();
        pool.close().await;

        let pool = DatabasePool::open_in(dir.path()).await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT count FROM limits WHERE user_id = 1")
            .fetch_one(&pool.reader)
            .await
            .unwrap();
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_adopts_tables_from_older_deployment() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("{}?mode=rwc", database_url_in(dir.path()));
        let legacy = SqlitePoolOptions::new().connect(&url).await.unwrap();
        sqlx::query("CREATE TABLE limits (user_id INTEGER PRIMARY KEY, date TEXT, count INTEGER)")
            .execute(&legacy)
            .await
            .unwrap();
        sqlx::query("INSERT INTO limits VALUES (5, '2024-03-01', 12)")
            .execute(&legacy)
            .await
            .unwrap();
        legacy.close().await;

        let pool = DatabasePool::open_in(dir.path()).await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT count FROM limits WHERE user_id = 5")
            .fetch_one(&pool.reader)
            .await
            .unwrap();
        assert_eq!(count, 12);
    }

    #[test]
    fn test_database_url_in() {
        let url = database_url_in(Path::new("/tmp/parley"));
        assert_eq!(url, "sqlite:///tmp/parley/parley.db");
    }
}
