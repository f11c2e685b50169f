//! Data models for articles at each stage of the pipeline.
//!
//! - [`ScrapedArticle`]: what the scraper extracts from one article page
//! - [`ArticleRow`]: one row of the in-memory table the cleaner works on;
//!   every column except `url` may be missing
//! - [`Article`]: a fully cleaned record, as read by the loader and stored
//!   in the `articles` table
//!
//! Field order of [`ArticleRow`] and [`Article`] is the column order of the
//! cleaned CSV.

use serde::{Deserialize, Serialize};

/// An article as scraped from a news site.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScrapedArticle {
    /// Text of the first element matching the site's body selector.
    pub body: String,
    /// Text of the first element matching the site's title selector.
    pub title: String,
    /// Absolute URL the article was fetched from.
    pub url: String,
}

/// A row of the cleaning table.
///
/// Raw CSVs only need a `url` column; missing columns and empty fields
/// deserialize to `None` and are filled in by the cleaning stages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleRow {
    pub uid: Option<String>,
    pub body: Option<String>,
    pub host: Option<String>,
    pub newspaper_uid: Option<String>,
    pub n_tokens_body: Option<usize>,
    pub n_tokens_title: Option<usize>,
    pub title: Option<String>,
    pub url: String,
}

impl ArticleRow {
    /// Convert to a complete [`Article`], or `None` if any column is missing.
    pub fn to_article(&self) -> Option<Article> {
        Some(Article {
            uid: self.uid.clone()?,
            body: self.body.clone()?,
            host: self.host.clone()?,
            newspaper_uid: self.newspaper_uid.clone()?,
            n_tokens_body: self.n_tokens_body? as i64,
            n_tokens_title: self.n_tokens_title? as i64,
            title: self.title.clone()?,
            url: self.url.clone(),
        })
    }
}

/// A cleaned article ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    /// MD5 hex digest of `url`; primary key in storage.
    pub uid: String,
    pub body: String,
    /// Network location of `url`.
    pub host: String,
    /// Publication identifier taken from the source filename.
    pub newspaper_uid: String,
    pub n_tokens_body: i64,
    pub n_tokens_title: i64,
    pub title: String,
    pub url: String,
}
