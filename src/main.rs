//! # Newspaper Pipeline
//!
//! Scrapes article listings from configured news sites, cleans the resulting
//! tables and loads them into a SQLite database.
//!
//! ## Usage
//!
//! ```sh
//! newspaper scrape eluniverso -o ./data
//! newspaper clean ./data/eluniverso_2025_05_06_articles.csv
//! newspaper load ./data/clean_eluniverso_2025_05_06_articles.csv
//! ```
//!
//! ## Architecture
//!
//! Each subcommand is one stage, run as its own process:
//! 1. **Scrape**: index a site's homepage, fetch each article, write a raw CSV
//! 2. **Clean**: derive newspaper uid, host, missing titles, uids and token
//!    counts, strip line breaks, write `clean_<file>`
//! 3. **Load**: insert every cleaned row into the `articles` table in one
//!    transaction
//!
//! Work inside a stage is strictly sequential.

use clap::Parser;
use std::error::Error;
use std::io::Write;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod config;
mod error;
mod models;
mod outputs;
mod recipe;
mod scrapers;
mod store;
mod utils;

use cli::{Cli, Command};
use config::Config;
use outputs::tables;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let result = match args.command {
        Command::Scrape {
            ref news_site,
            ref output_dir,
        } => run_scrape(&args.config, news_site, output_dir).await,
        Command::Clean {
            ref filename,
            ref encoding,
            no_save,
        } => run_clean(filename, encoding, no_save).await,
        Command::Load {
            ref filename,
            ref database_url,
        } => run_load(filename, database_url).await,
    };

    if let Err(ref e) = result {
        error!(error = %e, "Run failed");
        return result;
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

#[instrument(level = "info", skip(config_path))]
async fn run_scrape(
    config_path: &Path,
    news_site: &str,
    output_dir: &Path,
) -> Result<(), Box<dyn Error>> {
    let config = Config::load(config_path).await?;
    let site = config.site(news_site)?;

    // Fail before any fetch if the CSV can't be written
    if let Err(e) = ensure_writable_dir(output_dir).await {
        error!(
            path = %output_dir.display(),
            error = %e,
            "Output directory is not writable"
        );
        return Err(e);
    }

    let client = reqwest::Client::new();
    let articles = scrapers::scrape_site(&client, news_site, site).await?;
    let path = tables::write_articles(&articles, output_dir, news_site).await?;

    info!(count = articles.len(), path = %path.display(), "Scrape complete");
    println!("{}", articles.len());
    Ok(())
}

#[instrument(level = "info")]
async fn run_clean(filename: &Path, encoding: &str, no_save: bool) -> Result<(), Box<dyn Error>> {
    let table = recipe::clean(filename, encoding).await?;
    let table = recipe::finish(table);
    if table.is_empty() {
        warn!("No rows left after cleaning");
    }

    if !no_save {
        let out = recipe::clean_filename(filename);
        tables::write_table(&table, &out).await?;
    }

    let bytes = tables::table_to_csv(&table)?;
    std::io::stdout().write_all(&bytes)?;
    Ok(())
}

#[instrument(level = "info")]
async fn run_load(filename: &Path, database_url: &str) -> Result<(), Box<dyn Error>> {
    let loaded = store::load(filename, database_url).await?;
    info!(loaded, "Load complete");
    Ok(())
}
