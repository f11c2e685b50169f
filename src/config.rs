//! Site configuration loaded from `config.yaml`.
//!
//! The file maps each news site identifier to the homepage URL and the CSS
//! selectors used to find article links, bodies and titles:
//!
//! ```yaml
//! news_sites:
//!   eluniverso:
//!     url: https://www.eluniverso.com
//!     queries:
//!       homepage_article_links: ".story a"
//!       article_body: ".article-body"
//!       article_title: "h1"
//! ```

use crate::error::{PipelineError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, instrument};

/// Top-level configuration document.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Site identifier → scrape parameters.
    pub news_sites: BTreeMap<String, NewsSite>,
}

/// Scrape parameters for a single site.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsSite {
    /// Homepage URL, also used as the host when resolving relative links.
    pub url: String,
    pub queries: Queries,
}

/// CSS selectors applied to fetched pages.
#[derive(Debug, Clone, Deserialize)]
pub struct Queries {
    pub homepage_article_links: String,
    pub article_body: String,
    pub article_title: String,
}

impl Config {
    /// Read and parse the YAML config at `path`.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let config = Self::from_yaml(&raw)?;
        info!(sites = config.news_sites.len(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Configured site identifiers, in sorted order.
    pub fn site_choices(&self) -> Vec<String> {
        self.news_sites.keys().cloned().collect()
    }

    /// Look up a site, rejecting identifiers that are not configured.
    pub fn site(&self, uid: &str) -> Result<&NewsSite> {
        self.news_sites
            .get(uid)
            .ok_or_else(|| PipelineError::UnknownSite {
                site: uid.to_string(),
                choices: self.site_choices(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
news_sites:
  eluniverso:
    url: https://www.eluniverso.com
    queries:
      homepage_article_links: ".story a"
      article_body: ".article-body"
      article_title: "h1"
  elpais:
    url: https://elpais.com
    queries:
      homepage_article_links: "h2 a"
      article_body: "#cuerpo_noticia"
      article_title: ".articulo-titulo"
"##;

    #[test]
    fn test_parse_sites() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.site_choices(), vec!["elpais", "eluniverso"]);

        let site = config.site("eluniverso").unwrap();
        assert_eq!(site.url, "https://www.eluniverso.com");
        assert_eq!(site.queries.homepage_article_links, ".story a");
        assert_eq!(site.queries.article_body, ".article-body");
        assert_eq!(site.queries.article_title, "h1");
    }

    #[test]
    fn test_unknown_site_rejected() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        match config.site("lanacion") {
            Err(PipelineError::UnknownSite { site, choices }) => {
                assert_eq!(site, "lanacion");
                assert_eq!(choices, vec!["elpais", "eluniverso"]);
            }
            other => panic!("expected UnknownSite, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_queries_is_an_error() {
        let raw = "news_sites:\n  broken:\n    url: https://example.com\n";
        assert!(matches!(
            Config::from_yaml(raw),
            Err(PipelineError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        tokio::fs::write(&path, SAMPLE).await.unwrap();

        let config = Config::load(&path).await.unwrap();
        assert!(config.site("elpais").is_ok());
    }
}
