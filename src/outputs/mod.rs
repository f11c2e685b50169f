//! CSV output for scraped articles and cleaned tables.
//!
//! # Output Files
//!
//! ```text
//! output_dir/
//! ├── eluniverso_2025_05_06_articles.csv        # `scrape eluniverso`
//! └── clean_eluniverso_2025_05_06_articles.csv  # `clean` of the file above
//! ```

pub mod tables;
