use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::{ledger::DedupLedger, FetchResult, LedgerEntry, NewPhoto};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS photos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    photo_id INTEGER NOT NULL,
    url TEXT NOT NULL,
    file_path TEXT NOT NULL,
    embedding BLOB,
    added_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE(user_id, photo_id)
)
"#;

/// Ledger backed by a SQLite `photos` table with a unique `(user_id, photo_id)` key
#[derive(Debug, Clone)]
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    /// Connect to a `sqlite://` URL, creating the database file if needed
    pub async fn connect(url: &str) -> FetchResult<Self> {
        info!("Opening photo ledger at {}", url);
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        Self::connect_with(options, 4).await
    }

    /// Open or create the database file at `path`
    pub async fn open(path: impl AsRef<Path>) -> FetchResult<Self> {
        let path = path.as_ref();
        info!("Opening photo ledger at {}", path.display());
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        Self::connect_with(options, 4).await
    }

    /// A private in-memory database, gone when the ledger is dropped
    pub async fn in_memory() -> FetchResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        // Every connection to :memory: is its own database
        Self::connect_with(options, 1).await
    }

    async fn connect_with(options: SqliteConnectOptions, max_connections: u32) -> FetchResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let ledger = Self { pool };
        ledger.migrate().await?;
        Ok(ledger)
    }

    async fn migrate(&self) -> FetchResult<()> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl DedupLedger for SqliteLedger {
    async fn photo_exists(&self, user_id: i64, photo_id: i64) -> FetchResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM photos WHERE user_id = ? AND photo_id = ? LIMIT 1")
                .bind(user_id)
                .bind(photo_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }

    async fn add_photo(&self, photo: &NewPhoto) -> FetchResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO photos (user_id, photo_id, url, file_path, embedding, added_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(photo.user_id)
        .bind(photo.photo_id)
        .bind(&photo.url)
        .bind(&photo.file_path)
        .bind(photo.embedding.as_deref())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let inserted = result.rows_affected() > 0;
        if !inserted {
            debug!(
                "Photo {}/{} already recorded, keeping existing entry",
                photo.user_id, photo.photo_id
            );
        }
        Ok(inserted)
    }

    async fn get(&self, user_id: i64, photo_id: i64) -> FetchResult<Option<LedgerEntry>> {
        let entry = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT id, user_id, photo_id, url, file_path, embedding, added_at
            FROM photos
            WHERE user_id = ? AND photo_id = ?
            "#,
        )
        .bind(user_id)
        .bind(photo_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn count(&self) -> FetchResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM photos")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}
