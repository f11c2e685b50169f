//! Newspaper cleaning recipe.
//!
//! Turns a raw scraped CSV into rows ready for the loader. The core stages
//! run in this order, each over the whole table:
//!
//! 1. [`read_data`]: decode the file (ISO-8859-1 by default) and parse CSV
//! 2. [`extract_newspaper_uid`] / [`add_newspaper_uid_column`]
//! 3. [`extract_host`]
//! 4. [`fill_missing_titles`]
//! 5. [`generate_uids_for_rows`]
//! 6. [`remove_new_lines_from_body`]
//!
//! [`finish`] then counts tokens, drops duplicate titles and incomplete rows.
//!
//! The `uid` index is not unique: two rows with the same URL share a uid and
//! both stay in the table.

pub mod tokens;

use crate::error::{PipelineError, Result};
use crate::models::ArticleRow;
use encoding_rs::Encoding;
use itertools::Itertools;
use md5::{Digest, Md5};
use std::path::Path;
use tracing::{info, instrument, warn};
use url::Url;

/// Encoding of raw CSVs unless told otherwise.
pub const DEFAULT_ENCODING: &str = "iso-8859-1";

/// In-memory table of article rows, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleTable {
    pub rows: Vec<ArticleRow>,
}

impl ArticleTable {
    pub fn new(rows: Vec<ArticleRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every row keyed by `uid`. More than one row may match.
    pub fn by_uid<'a>(&'a self, uid: &'a str) -> impl Iterator<Item = &'a ArticleRow> + 'a {
        self.rows
            .iter()
            .filter(move |row| row.uid.as_deref() == Some(uid))
    }

    /// uids carried by more than one row, each listed once.
    pub fn shared_uids(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|row| row.uid.as_deref())
            .duplicates()
            .collect()
    }
}

/// Run the core cleaning stages on the CSV at `filename`.
///
/// # Arguments
///
/// * `filename` - Raw CSV whose name starts with `<newspaper_uid>_`
/// * `encoding` - Encoding label used to decode the file
///
/// # Returns
///
/// The cleaned table, or an error if the file cannot be read or decoded, or
/// lacks a `url` column.
#[instrument(level = "info", skip_all, fields(filename = %filename.as_ref().display()))]
pub async fn clean(filename: impl AsRef<Path>, encoding: &str) -> Result<ArticleTable> {
    info!("Starting cleaning process");
    let filename = filename.as_ref();

    let table = read_data(filename, encoding).await?;
    let newspaper_uid = extract_newspaper_uid(filename);
    let table = add_newspaper_uid_column(table, &newspaper_uid);
    let table = extract_host(table);
    let table = fill_missing_titles(table);
    let table = generate_uids_for_rows(table);
    let table = remove_new_lines_from_body(table);

    info!(rows = table.len(), "Cleaning finished");
    Ok(table)
}

/// Read `filename`, decoding it with the encoding named by `label`.
#[instrument(level = "info", skip_all, fields(filename = %filename.display(), encoding = %label))]
pub async fn read_data(filename: &Path, label: &str) -> Result<ArticleTable> {
    info!("Reading file");
    let encoding = Encoding::for_label(label.as_bytes())
        .ok_or_else(|| PipelineError::Encoding(label.to_string()))?;

    let bytes = tokio::fs::read(filename).await?;
    let (text, _, _) = encoding.decode(&bytes);
    parse_csv(&text)
}

/// Parse CSV text whose first row is a header.
pub fn parse_csv(text: &str) -> Result<ArticleTable> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let rows = reader
        .deserialize::<ArticleRow>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ArticleTable::new(rows))
}

/// Text before the first `_` of the file name, e.g. `eluniverso` for
/// `data/eluniverso_2024_articles.csv`.
pub fn extract_newspaper_uid(filename: &Path) -> String {
    let name = filename
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let newspaper_uid = name.split('_').next().unwrap_or_default().to_string();
    info!(%newspaper_uid, "Newspaper uid detected");
    newspaper_uid
}

/// Set `newspaper_uid` on every row to the same value.
///
/// # Arguments
///
/// * `table` - The table to update
/// * `newspaper_uid` - Identifier from [`extract_newspaper_uid`]
pub fn add_newspaper_uid_column(mut table: ArticleTable, newspaper_uid: &str) -> ArticleTable {
    info!(%newspaper_uid, "Filling newspaper_uid column");
    for row in &mut table.rows {
        row.newspaper_uid = Some(newspaper_uid.to_string());
    }
    table
}

/// Network location of `url`: userinfo, host and port, without scheme or
/// path. Unparseable URLs have an empty network location.
pub fn netloc(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };

    let mut out = String::new();
    if !parsed.username().is_empty() {
        out.push_str(parsed.username());
        if let Some(password) = parsed.password() {
            out.push(':');
            out.push_str(password);
        }
        out.push('@');
    }
    if let Some(host) = parsed.host_str() {
        out.push_str(host);
    }
    if let Some(port) = parsed.port() {
        out.push(':');
        out.push_str(&port.to_string());
    }
    out
}

/// Fill `host` on every row with the [`netloc`] of its own `url`.
///
/// Existing `host` values are overwritten so the two columns never disagree.
pub fn extract_host(mut table: ArticleTable) -> ArticleTable {
    info!("Extracting host from urls");
    for row in &mut table.rows {
        row.host = Some(netloc(&row.url));
    }
    table
}

/// Title guessed from the last path segment of `url`, dashes turned into
/// spaces.
///
/// Trailing slashes are trimmed before the segment is taken, so
/// `https://a.com/news/one-two/` gives `one two` rather than an empty title.
/// Each dash becomes one space; runs of dashes are not collapsed.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(title_from_url("https://a.com/some-article-title"), "some article title");
/// ```
pub fn title_from_url(url: &str) -> String {
    let segment = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    segment.split('-').join(" ")
}

/// Give every row without a title one derived from its URL.
///
/// A title counts as missing when the column is absent or blank
/// (whitespace only). Present titles are left untouched.
pub fn fill_missing_titles(mut table: ArticleTable) -> ArticleTable {
    info!("Filling missing titles");
    let mut filled = 0usize;
    for row in &mut table.rows {
        if row.title.as_deref().is_none_or(|t| t.trim().is_empty()) {
            row.title = Some(title_from_url(&row.url));
            filled += 1;
        }
    }
    info!(filled, "Missing titles filled");
    table
}

/// Lowercase hex MD5 digest of `url`.
pub fn uid_for_url(url: &str) -> String {
    hex::encode(Md5::digest(url.as_bytes()))
}

/// Key every row by [`uid_for_url`] of its `url`.
///
/// Rows sharing a URL end up with the same uid; they are logged and kept.
pub fn generate_uids_for_rows(mut table: ArticleTable) -> ArticleTable {
    info!("Generating uids for each row");
    for row in &mut table.rows {
        row.uid = Some(uid_for_url(&row.url));
    }
    for uid in table.shared_uids() {
        let rows = table.by_uid(uid).count();
        warn!(%uid, rows, "Rows share a uid");
    }
    table
}

/// `body` with every `\n` and `\r` removed; all other characters kept in order.
pub fn strip_new_lines(body: &str) -> String {
    body.chars().filter(|c| !matches!(c, '\n' | '\r')).collect()
}

pub fn remove_new_lines_from_body(mut table: ArticleTable) -> ArticleTable {
    info!("Removing new lines from body");
    for row in &mut table.rows {
        if let Some(body) = row.body.as_deref() {
            row.body = Some(strip_new_lines(body));
        }
    }
    table
}

/// Finishing stages run by the `clean` command after [`clean`].
pub fn finish(table: ArticleTable) -> ArticleTable {
    let table = tokenize_columns(table);
    let table = remove_duplicate_entries(table);
    drop_rows_with_missing_values(table)
}

/// Set `n_tokens_title` / `n_tokens_body` from [`tokens::count_tokens`].
/// A missing text gives a missing count.
pub fn tokenize_columns(mut table: ArticleTable) -> ArticleTable {
    info!("Counting tokens in title and body");
    for row in &mut table.rows {
        row.n_tokens_title = row.title.as_deref().map(tokens::count_tokens);
        row.n_tokens_body = row.body.as_deref().map(tokens::count_tokens);
    }
    table
}

/// Drop rows whose title was already seen, keeping the first.
pub fn remove_duplicate_entries(table: ArticleTable) -> ArticleTable {
    let before = table.len();
    let rows: Vec<ArticleRow> = table
        .rows
        .into_iter()
        .unique_by(|row| row.title.clone())
        .collect();
    info!(removed = before - rows.len(), "Removed duplicate titles");
    ArticleTable::new(rows)
}

/// Keep only rows that convert to a complete [`crate::models::Article`].
pub fn drop_rows_with_missing_values(table: ArticleTable) -> ArticleTable {
    let before = table.len();
    let rows: Vec<ArticleRow> = table
        .rows
        .into_iter()
        .filter(|row| row.to_article().is_some())
        .collect();
    info!(removed = before - rows.len(), "Dropped rows with missing values");
    ArticleTable::new(rows)
}

/// Output path for the cleaned table: `clean_<name>` beside the input.
pub fn clean_filename(filename: &Path) -> std::path::PathBuf {
    let name = filename
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    filename.with_file_name(format!("clean_{}", name))
}
