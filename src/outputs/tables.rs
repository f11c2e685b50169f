//! Serialization of article rows to CSV.
//!
//! Scraped articles are written with the `body,title,url` header in
//! [`DEFAULT_ENCODING`], the encoding `clean` reads by default. Cleaned
//! tables are UTF-8 and use the loader's column order (see
//! [`crate::models::Article`]).

use crate::error::{PipelineError, Result};
use crate::models::ScrapedArticle;
use crate::recipe::{ArticleTable, DEFAULT_ENCODING};
use chrono::{Local, NaiveDate};
use encoding_rs::Encoding;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument, warn};

/// Serialize `rows` to CSV bytes with a header row.
pub fn to_csv_bytes<T: Serialize>(rows: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(bytes)
}

/// Encode UTF-8 CSV text with the encoding named by `label`.
///
/// # Arguments
///
/// * `text` - CSV text as produced by [`to_csv_bytes`]
/// * `label` - WHATWG encoding label, e.g. `"iso-8859-1"`
///
/// # Returns
///
/// The encoded bytes. Characters the encoding cannot represent are written as
/// HTML numeric character references (`&#NNNN;`) and a warning is logged.
pub fn encode_text(text: &str, label: &str) -> Result<Vec<u8>> {
    let encoding = Encoding::for_label(label.as_bytes())
        .ok_or_else(|| PipelineError::Encoding(label.to_string()))?;
    let (bytes, _, unmappable) = encoding.encode(text);
    if unmappable {
        warn!(
            encoding = encoding.name(),
            "Some characters cannot be represented; written as numeric references"
        );
    }
    Ok(bytes.into_owned())
}

pub fn table_to_csv(table: &ArticleTable) -> Result<Vec<u8>> {
    to_csv_bytes(&table.rows)
}

/// `<news_site_uid>_<YYYY_MM_DD>_articles.csv`
pub fn scraped_filename(news_site_uid: &str, date: NaiveDate) -> String {
    format!("{}_{}_articles.csv", news_site_uid, date.format("%Y_%m_%d"))
}

/// Write scraped articles for `news_site_uid` into `output_dir`.
///
/// The file name starts with the site identifier so that `clean` can recover
/// it as the newspaper uid.
#[instrument(level = "info", skip(articles), fields(count = articles.len()))]
pub async fn write_articles(
    articles: &[ScrapedArticle],
    output_dir: &Path,
    news_site_uid: &str,
) -> Result<PathBuf> {
    if let Err(e) = fs::create_dir_all(output_dir).await {
        error!(output_dir = %output_dir.display(), error = %e, "Failed to create output dir");
        return Err(e.into());
    }

    let path = output_dir.join(scraped_filename(news_site_uid, Local::now().date_naive()));
    let utf8 = to_csv_bytes(articles)?;
    let text = String::from_utf8_lossy(&utf8);
    let bytes = encode_text(&text, DEFAULT_ENCODING)?;
    fs::write(&path, bytes).await?;
    info!(path = %path.display(), encoding = DEFAULT_ENCODING, "Wrote scraped articles");
    Ok(path)
}

/// Write a cleaned table to `path`.
#[instrument(level = "info", skip(table), fields(rows = table.len()))]
pub async fn write_table(table: &ArticleTable, path: &Path) -> Result<()> {
    let bytes = table_to_csv(table)?;
    fs::write(path, bytes).await?;
    info!(path = %path.display(), "Wrote cleaned table");
    Ok(())
}
