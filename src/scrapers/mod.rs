//! Scrape driver for configured news sites.
//!
//! Scraping follows the same two-phase pattern for every site:
//!
//! 1. **Indexing**: fetch the homepage and collect article links with the
//!    site's `homepage_article_links` selector
//! 2. **Fetching**: resolve each link against the site URL, fetch it, and keep
//!    the article if its body is non-empty
//!
//! Articles are fetched one after another. A transport failure on a single
//! article (connection error, timeout, error status) is logged and the
//! article is skipped; only a failed homepage fetch aborts the run.

pub mod pages;

use crate::config::NewsSite;
use crate::error::Result;
use crate::models::ScrapedArticle;
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use pages::{ArticlePage, HomePage, SiteSelectors};
use regex::Regex;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

static WELL_FORMED_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://.+/.+$").unwrap());
static ROOT_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/.+$").unwrap());

/// Resolve an article link found on the homepage of `host`.
///
/// - absolute links (`http(s)://host/path`) are returned unchanged
/// - root-relative links (`/path`) are appended to `host`
/// - anything else is joined to `host` with a `/`
pub fn build_link(host: &str, link: &str) -> String {
    if WELL_FORMED_LINK.is_match(link) {
        link.to_string()
    } else if ROOT_PATH.is_match(link) {
        format!("{}{}", host, link)
    } else {
        format!("{}/{}", host, link)
    }
}

/// Scrape every article linked from `site`'s homepage.
#[instrument(level = "info", skip(client, site), fields(host = %site.url))]
pub async fn scrape_site(
    client: &Client,
    news_site_uid: &str,
    site: &NewsSite,
) -> Result<Vec<ScrapedArticle>> {
    info!("Begin scraper");
    let selectors = SiteSelectors::compile(&site.queries)?;
    let homepage = HomePage::fetch(client, &site.url, &selectors).await?;

    let host = site.url.as_str();
    let selectors = &selectors;
    let articles: Vec<ScrapedArticle> = stream::iter(homepage.article_links)
        .then(|link: String| async move { fetch_article(client, host, &link, selectors).await })
        .filter_map(std::future::ready)
        .collect()
        .await;

    info!(count = articles.len(), "Fetched article contents");
    Ok(articles)
}

/// Fetch one article, returning `None` when it should be left out.
#[instrument(level = "info", skip(client, host, selectors))]
async fn fetch_article(
    client: &Client,
    host: &str,
    link: &str,
    selectors: &SiteSelectors,
) -> Option<ScrapedArticle> {
    let url = build_link(host, link);
    debug!(%url, "Start fetching article");

    let page = match ArticlePage::fetch(client, &url, selectors).await {
        Ok(page) => page,
        Err(e) => {
            warn!(error = %e, %url, transport = e.is_transport(), "Error while fetching the article");
            return None;
        }
    };

    if page.body.is_empty() {
        warn!(%url, "Invalid article, there is no body");
        return None;
    }

    info!(%url, "Article fetched");
    debug!(preview = %truncate_for_log(&page.body, 120), "Article body");
    Some(ScrapedArticle {
        body: page.body,
        title: page.title,
        url: page.url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Queries;
    use httpmock::prelude::*;

    #[test]
    fn test_build_link_absolute_unchanged() {
        assert_eq!(
            build_link("https://site.com", "https://other.com/a/b"),
            "https://other.com/a/b"
        );
        assert_eq!(
            build_link("https://site.com", "http://site.com/news/1"),
            "http://site.com/news/1"
        );
    }

    #[test]
    fn test_build_link_root_relative() {
        assert_eq!(build_link("https://site.com", "/a/b"), "https://site.com/a/b");
    }

    #[test]
    fn test_build_link_relative() {
        assert_eq!(build_link("https://site.com", "a/b"), "https://site.com/a/b");
        // An absolute URL without a path does not count as well formed.
        assert_eq!(
            build_link("https://site.com", "https://other.com"),
            "https://site.com/https://other.com"
        );
    }

    fn site(url: String) -> NewsSite {
        NewsSite {
            url,
            queries: Queries {
                homepage_article_links: ".story a".to_string(),
                article_body: ".body".to_string(),
                article_title: "h1".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_scrape_site_skips_failures_and_empty_bodies() {
        // Port 9 (discard) has no listener, so the last link fails to connect.
        let server = MockServer::start_async().await;
        let base = server.base_url();

        let home = server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(200).header("content-type", "text/html").body(format!(
                    r#"<html><body>
                        <div class="story"><a href="/good">Good</a></div>
                        <div class="story"><a href="relative">Relative</a></div>
                        <div class="story"><a href="/missing">Missing</a></div>
                        <div class="story"><a href="/empty">Empty</a></div>
                        <div class="story"><a href="{base}/absolute/story">Absolute</a></div>
                        <div class="story"><a href="http://127.0.0.1:9/refused">Refused</a></div>
                    </body></html>"#
                ));
            })
            .await;
        let good = server
            .mock_async(|when, then| {
                when.method(GET).path("/good");
                then.status(200)
                    .body(r#"<h1>Good one</h1><div class="body">Body text</div>"#);
            })
            .await;
        let relative = server
            .mock_async(|when, then| {
                when.method(GET).path("/relative");
                then.status(200)
                    .body(r#"<h1>Relative</h1><div class="body">Relative body</div>"#);
            })
            .await;
        let missing = server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404);
            })
            .await;
        let empty = server
            .mock_async(|when, then| {
                when.method(GET).path("/empty");
                then.status(200).body("<h1>No body here</h1>");
            })
            .await;
        let absolute = server
            .mock_async(|when, then| {
                when.method(GET).path("/absolute/story");
                then.status(200)
                    .body(r#"<div class="body">Absolute body</div>"#);
            })
            .await;

        let client = Client::new();
        let articles = scrape_site(&client, "mock", &site(base.clone()))
            .await
            .unwrap();

        home.assert_async().await;
        good.assert_async().await;
        relative.assert_async().await;
        missing.assert_async().await;
        empty.assert_async().await;
        absolute.assert_async().await;

        let urls: Vec<&str> = articles.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                format!("{base}/good"),
                format!("{base}/relative"),
                format!("{base}/absolute/story"),
            ]
        );
        assert_eq!(articles[0].title, "Good one");
        assert_eq!(articles[0].body, "Body text");
        assert_eq!(articles[2].title, "");
    }

    #[tokio::test]
    async fn test_homepage_failure_aborts() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(500);
            })
            .await;

        let client = Client::new();
        let err = scrape_site(&client, "mock", &site(server.base_url()))
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
