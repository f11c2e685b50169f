//! Error type shared by the scrape, clean and load stages.
//!
//! Transport failures raised while fetching a single article are caught by the
//! scrape driver and never reach this type's callers; everything else
//! propagates up to `main` and ends the run.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("unknown news site `{site}` (choose from: {})", choices.join(", "))]
    UnknownSite { site: String, choices: Vec<String> },

    #[error("invalid selector `{query}`: {message}")]
    Selector { query: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("unknown text encoding `{0}`")]
    Encoding(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl PipelineError {
    /// Whether the error came from the network rather than from our own data.
    pub fn is_transport(&self) -> bool {
        matches!(self, PipelineError::Http(_))
    }
}
