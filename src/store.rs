//! SQLite persistence for cleaned articles.
//!
//! The `articles` table is created on connect if it does not exist. A batch
//! of articles is inserted inside a single transaction and committed once;
//! if any insert fails the transaction is dropped, which rolls it back, and
//! the error is returned.

use crate::error::Result;
use crate::models::Article;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, instrument};

pub const DEFAULT_DATABASE_URL: &str = "sqlite:newspaper.db";

pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if needed) the database at `database_url`.
    #[instrument(level = "info")]
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.initialize_schema().await?;
        Ok(store)
    }

    async fn initialize_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id TEXT PRIMARY KEY,
                body TEXT,
                host TEXT,
                newspaper_uid TEXT,
                n_tokens_body INTEGER,
                n_tokens_title INTEGER,
                title TEXT UNIQUE,
                url TEXT UNIQUE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert every article in one transaction.
    ///
    /// # Returns
    ///
    /// The number of rows inserted. On the first failing insert the
    /// transaction is rolled back and the database error is returned.
    #[instrument(level = "info", skip_all, fields(count = articles.len()))]
    pub async fn insert_all(&self, articles: &[Article]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        for article in articles {
            info!(uid = %article.uid, "Loading article into DB");
            sqlx::query(
                r#"
                INSERT INTO articles
                (id, body, host, newspaper_uid, n_tokens_body, n_tokens_title, title, url)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&article.uid)
            .bind(&article.body)
            .bind(&article.host)
            .bind(&article.newspaper_uid)
            .bind(article.n_tokens_body)
            .bind(article.n_tokens_title)
            .bind(&article.title)
            .bind(&article.url)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("Committed article batch");
        Ok(articles.len())
    }

    /// Number of rows in `articles`.
    pub async fn count(&self) -> Result<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// Read a cleaned CSV. Every column of [`Article`] must be present.
pub async fn read_articles(filename: &Path) -> Result<Vec<Article>> {
    let bytes = tokio::fs::read(filename).await?;
    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    let articles = reader
        .deserialize::<Article>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(articles)
}

/// Load the cleaned CSV at `filename` into the database.
///
/// # Arguments
///
/// * `filename` - CSV with the columns of [`Article`]
/// * `database_url` - SQLite URL; the file is created if missing
///
/// # Returns
///
/// The number of articles loaded. Missing columns and persistence failures
/// are returned as errors and nothing is committed.
#[instrument(level = "info", skip_all, fields(filename = %filename.display()))]
pub async fn load(filename: &Path, database_url: &str) -> Result<usize> {
    let store = Store::connect(database_url).await?;
    let articles = read_articles(filename).await?;
    let loaded = store.insert_all(&articles).await?;
    let total = store.count().await?;
    store.close().await;
    info!(loaded, total, "Articles loaded");
    Ok(loaded)
}
