//! Durable, insert-only article store backed by SQLite.
//!
//! The store owns the single uniqueness rule of the crawl: a URL is persisted
//! at most once. Every insert is its own committed statement, so a killed
//! process loses nothing that [`ArticleStore::insert`] reported as stored.
//!
//! Reopening an existing database is safe; the schema is only created when
//! missing.

use crate::models::ArticleRecord;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS articles (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        url TEXT NOT NULL UNIQUE,
        published_at TEXT NOT NULL,
        comment_count INTEGER NOT NULL DEFAULT 0,
        fetched_at TEXT NOT NULL,
        rating REAL NOT NULL DEFAULT 0
    )
"#;

/// Errors raised by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to create database directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of a single insert attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A record with the same URL already exists.
    Duplicate,
}

/// SQLite-backed [`ArticleRecord`] store.
#[derive(Debug, Clone)]
pub struct ArticleStore {
    pool: SqlitePool,
    path: PathBuf,
}

impl ArticleStore {
    /// Open the database at `path`, creating the file and schema if absent.
    ///
    /// # Errors
    ///
    /// Fails if the parent directory cannot be created, the file cannot be
    /// opened, or the schema statement fails.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Directory {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .synchronous(SqliteSynchronous::Full);

        // Single writer: one connection is all the crawl ever uses.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(SCHEMA).execute(&pool).await?;
        info!("Article store ready");

        Ok(Self {
            pool,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored records.
    pub async fn count(&self) -> Result<u64, StoreError> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;
        Ok(n as u64)
    }

    /// Persist `record` unless its URL is already stored.
    ///
    /// # Errors
    ///
    /// Any database failure other than the URL uniqueness violation.
    pub async fn try_insert(&self, record: &ArticleRecord) -> Result<InsertOutcome, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO articles
            (id, title, body, url, published_at, comment_count, fetched_at, rating)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.title)
        .bind(&record.body)
        .bind(&record.url)
        .bind(&record.published_at)
        .bind(record.comment_count)
        .bind(record.fetched_at)
        .bind(record.rating)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(InsertOutcome::Duplicate),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist `record`, returning `true` only if it was newly stored.
    ///
    /// Duplicates are expected once a run overlaps already-harvested days and
    /// yield `false` quietly. Other failures are logged and also yield
    /// `false`; the crawl carries on.
    pub async fn insert(&self, record: &ArticleRecord) -> bool {
        match self.try_insert(record).await {
            Ok(InsertOutcome::Inserted) => true,
            Ok(InsertOutcome::Duplicate) => {
                debug!(url = %record.url, "Article already stored");
                false
            }
            Err(e) => {
                error!(url = %record.url, error = %e, "Failed to store article");
                false
            }
        }
    }

    /// Close the pool, waiting for the connection to shut down cleanly.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
impl ArticleStore {
    /// Look up the record stored for `url`.
    pub async fn find_by_url(&self, url: &str) -> Result<Option<ArticleRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, body, url, published_at, comment_count, fetched_at, rating
            FROM articles
            WHERE url = ?
            "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(record_from_row).transpose()?)
    }
}

#[cfg(test)]
fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<ArticleRecord, sqlx::Error> {
    use sqlx::Row;

    let id: String = row.try_get("id")?;
    Ok(ArticleRecord {
        id: uuid::Uuid::parse_str(&id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        title: row.try_get("title")?,
        body: row.try_get("body")?,
        url: row.try_get("url")?,
        published_at: row.try_get("published_at")?,
        fetched_at: row.try_get("fetched_at")?,
        comment_count: row.try_get("comment_count")?,
        rating: row.try_get("rating")?,
    })
}
