//! Page objects for a configured news site.
//!
//! A [`HomePage`] yields candidate article links; an [`ArticlePage`] yields
//! the body and title of one article. Both fetch their URL once, parse it
//! with `scraper`, and keep only the extracted text so no parsed document is
//! held across an await point.

use crate::config::Queries;
use crate::error::{PipelineError, Result};
use itertools::Itertools;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};

/// Compiled form of a site's [`Queries`].
#[derive(Debug, Clone)]
pub struct SiteSelectors {
    pub article_links: Selector,
    pub article_body: Selector,
    pub article_title: Selector,
}

impl SiteSelectors {
    /// Compile every selector up front so a typo fails before any fetch.
    pub fn compile(queries: &Queries) -> Result<Self> {
        Ok(Self {
            article_links: parse_selector(&queries.homepage_article_links)?,
            article_body: parse_selector(&queries.article_body)?,
            article_title: parse_selector(&queries.article_title)?,
        })
    }
}

fn parse_selector(query: &str) -> Result<Selector> {
    Selector::parse(query).map_err(|e| PipelineError::Selector {
        query: query.to_string(),
        message: e.to_string(),
    })
}

/// GET `url` and return the body text. Non-success statuses are errors.
#[instrument(level = "debug", skip(client))]
async fn visit(client: &Client, url: &str) -> Result<String> {
    let html = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    debug!(bytes = html.len(), "Fetched page");
    Ok(html)
}

/// Text content of the first element matching `selector`, or `""`.
fn first_text(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>())
        .unwrap_or_default()
}

/// A site's homepage.
#[derive(Debug, Clone)]
pub struct HomePage {
    /// `href` values of the matched link elements, first occurrence kept.
    pub article_links: Vec<String>,
}

impl HomePage {
    #[instrument(level = "info", skip(client, selectors))]
    pub async fn fetch(client: &Client, url: &str, selectors: &SiteSelectors) -> Result<Self> {
        let html = visit(client, url).await?;
        let article_links = Self::extract_links(&html, &selectors.article_links);
        info!(count = article_links.len(), "Indexed article links");
        Ok(Self { article_links })
    }

    fn extract_links(html: &str, selector: &Selector) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(selector)
            .filter_map(|element| element.value().attr("href"))
            .map(str::to_string)
            .unique()
            .collect()
    }
}

/// A single article page.
#[derive(Debug, Clone)]
pub struct ArticlePage {
    pub url: String,
    pub body: String,
    pub title: String,
}

impl ArticlePage {
    #[instrument(level = "info", skip(client, selectors))]
    pub async fn fetch(client: &Client, url: &str, selectors: &SiteSelectors) -> Result<Self> {
        let html = visit(client, url).await?;
        Ok(Self::parse(url, &html, selectors))
    }

    fn parse(url: &str, html: &str, selectors: &SiteSelectors) -> Self {
        let document = Html::parse_document(html);
        Self {
            url: url.to_string(),
            body: first_text(&document, &selectors.article_body),
            title: first_text(&document, &selectors.article_title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors() -> SiteSelectors {
        SiteSelectors::compile(&Queries {
            homepage_article_links: ".story a".to_string(),
            article_body: ".article-body".to_string(),
            article_title: "h1".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_invalid_selector() {
        let err = SiteSelectors::compile(&Queries {
            homepage_article_links: "a[".to_string(),
            article_body: "p".to_string(),
            article_title: "h1".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, PipelineError::Selector { ref query, .. } if query == "a["));
    }

    #[test]
    fn test_extract_links_skips_missing_href_and_duplicates() {
        let html = r#"<html><body>
            <div class="story"><a href="/one">One</a></div>
            <div class="story"><a>No link</a></div>
            <div class="story"><a href="https://site.com/two/x">Two</a></div>
            <div class="story"><a href="/one">One again</a></div>
            <a href="/not-a-story">Elsewhere</a>
        </body></html>"#;

        let links = HomePage::extract_links(html, &selectors().article_links);
        assert_eq!(links, vec!["/one", "https://site.com/two/x"]);
    }

    #[test]
    fn test_article_parse_takes_first_match() {
        let html = r#"<html><body>
            <h1>Headline <em>here</em></h1>
            <h1>Second headline</h1>
            <div class="article-body">First paragraph.
Second line.</div>
            <div class="article-body">Ignored</div>
        </body></html>"#;

        let page = ArticlePage::parse("https://site.com/a", html, &selectors());
        assert_eq!(page.title, "Headline here");
        assert_eq!(page.body, "First paragraph.\nSecond line.");
    }

    #[test]
    fn test_article_parse_missing_elements() {
        let page = ArticlePage::parse("https://site.com/a", "<p>nothing</p>", &selectors());
        assert_eq!(page.body, "");
        assert_eq!(page.title, "");
    }
}
