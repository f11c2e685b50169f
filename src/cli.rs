//! Command-line interface definitions.
//!
//! One binary, three subcommands, one per pipeline stage. Options that are
//! commonly set per deployment can also come from environment variables.

use crate::recipe::DEFAULT_ENCODING;
use crate::store::DEFAULT_DATABASE_URL;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Scrape news sites, clean the scraped tables and load them into SQLite.
///
/// # Examples
///
/// ```sh
/// newspaper scrape eluniverso -o ./data
/// newspaper clean ./data/eluniverso_2025_05_06_articles.csv
/// newspaper load ./data/clean_eluniverso_2025_05_06_articles.csv
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML file listing the news sites
    #[arg(short, long, global = true, env = "NEWSPAPER_CONFIG", default_value = "config.yaml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape the articles linked from a news site's homepage
    Scrape {
        /// The news site that you want to scrape
        news_site: String,

        /// Directory the scraped CSV is written to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Clean a scraped CSV and print the resulting table
    Clean {
        /// Path to the dirty data
        filename: PathBuf,

        /// Text encoding of the input file
        #[arg(long, default_value = DEFAULT_ENCODING)]
        encoding: String,

        /// Print the table without writing `clean_<filename>`
        #[arg(long)]
        no_save: bool,
    },

    /// Load a cleaned CSV into the database
    Load {
        /// The file you want to load to the db
        filename: PathBuf,

        /// SQLite connection URL
        #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
        database_url: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_parsing() {
        let cli = Cli::parse_from(["newspaper", "scrape", "eluniverso", "-o", "/tmp/out"]);
        assert_eq!(cli.config, PathBuf::from("config.yaml"));
        match cli.command {
            Command::Scrape { news_site, output_dir } => {
                assert_eq!(news_site, "eluniverso");
                assert_eq!(output_dir, PathBuf::from("/tmp/out"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_clean_defaults() {
        let cli = Cli::parse_from(["newspaper", "clean", "eluniverso_2024.csv"]);
        match cli.command {
            Command::Clean { filename, encoding, no_save } => {
                assert_eq!(filename, PathBuf::from("eluniverso_2024.csv"));
                assert_eq!(encoding, "iso-8859-1");
                assert!(!no_save);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_load_with_global_config_after_subcommand() {
        let cli = Cli::parse_from([
            "newspaper",
            "load",
            "clean.csv",
            "--database-url",
            "sqlite::memory:",
            "-c",
            "sites.yaml",
        ]);
        assert_eq!(cli.config, PathBuf::from("sites.yaml"));
        assert!(matches!(
            cli.command,
            Command::Load { ref database_url, .. } if database_url == "sqlite::memory:"
        ));
    }

    #[test]
    fn test_missing_positional_is_rejected() {
        assert!(Cli::try_parse_from(["newspaper", "clean"]).is_err());
    }
}
