//! Yahoo Finance adapter: scrapes the stock-market-news topic page for
//! candidates and article pages for their body text.

use std::time::Duration;

use bytes::Bytes;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use super::{Article, ArticleSource};
use crate::config::SourceConfig;
use crate::{Error, Result};

const MAX_PAGE_BYTES: usize = 5 * 1024 * 1024;

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// Story tiles on the topic page and the body container on article pages.
const ITEM_SELECTOR: &str = "li.stream-item, div.stream-item";
const HEADLINE_SELECTOR: &str = "h3";
const DESCRIPTION_SELECTOR: &str = "p";
const LINK_SELECTOR: &str = "a[href]";
const BODY_SELECTOR: &str = "div.caas-body p, div.body p";

pub struct YahooFinanceSource {
    client: Client,
    feed_url: Url,
    max_candidates: usize,
    item_selector: Selector,
    headline_selector: Selector,
    description_selector: Selector,
    link_selector: Selector,
    body_selector: Selector,
    // Trailing "Most Read from Bloomberg ..." teasers in descriptions and
    // "(Reporting by ...)" credit lines in bodies are syndication noise.
    description_boilerplate: Regex,
    reporting_credit: Regex,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Config(format!("invalid selector '{}': {}", css, e)))
}

impl YahooFinanceSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .gzip(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            feed_url: Url::parse(&config.feed_url)?,
            max_candidates: config.max_candidates,
            item_selector: selector(ITEM_SELECTOR)?,
            headline_selector: selector(HEADLINE_SELECTOR)?,
            description_selector: selector(DESCRIPTION_SELECTOR)?,
            link_selector: selector(LINK_SELECTOR)?,
            body_selector: selector(BODY_SELECTOR)?,
            description_boilerplate: Regex::new(r"Most Read from Bloomberg.*")
                .map_err(|e| Error::Config(e.to_string()))?,
            reporting_credit: Regex::new(r"(?s)\(Reporting by.*?\)")
                .map_err(|e| Error::Config(e.to_string()))?,
        })
    }

    fn build_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers
    }

    async fn fetch_page(&self, url: &Url) -> std::result::Result<Bytes, String> {
        let response = self
            .client
            .get(url.clone())
            .headers(Self::build_headers())
            .send()
            .await
            .map_err(|e| format!("request failed for {}: {}", url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {} for {}", status, url));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| format!("failed to read body of {}: {}", url, e))?;

        if bytes.len() > MAX_PAGE_BYTES {
            return Err(format!("page too large ({} bytes) for {}", bytes.len(), url));
        }

        Ok(bytes)
    }

    /// Pull candidate articles out of topic-page HTML.
    fn parse_candidates(&self, html: &str) -> Vec<Article> {
        let document = Html::parse_document(html);
        let mut articles = Vec::new();

        for item in document.select(&self.item_selector) {
            if articles.len() >= self.max_candidates {
                break;
            }

            let Some(headline) = item
                .select(&self.headline_selector)
                .next()
                .map(|h| h.text().collect::<String>().trim().to_string())
                .filter(|h| !h.is_empty())
            else {
                continue;
            };

            let Some(link) = item
                .select(&self.link_selector)
                .next()
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| self.feed_url.join(href).ok())
            else {
                continue;
            };

            let description = item
                .select(&self.description_selector)
                .next()
                .map(|p| p.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            let description = self.clean_description(&description);

            articles.push(Article::new(headline, description, link));
        }

        articles
    }

    /// Pull the body text out of article-page HTML, if a body is present.
    fn parse_article_body(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);

        let paragraphs: Vec<String> = document
            .select(&self.body_selector)
            .map(|p| p.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        if paragraphs.is_empty() {
            return None;
        }

        Some(self.clean_body(&paragraphs.join(" ")))
    }

    fn clean_description(&self, description: &str) -> String {
        self.description_boilerplate
            .replace(description, "")
            .trim()
            .to_string()
    }

    fn clean_body(&self, body: &str) -> String {
        self.reporting_credit.replace_all(body, "").trim().to_string()
    }
}

#[async_trait::async_trait]
impl ArticleSource for YahooFinanceSource {
    async fn fetch_candidates(&self) -> Result<Vec<Article>> {
        let bytes = self
            .fetch_page(&self.feed_url)
            .await
            .map_err(Error::Fetch)?;

        let html = String::from_utf8_lossy(&bytes);
        let articles = self.parse_candidates(&html);

        tracing::debug!("Found {} candidate articles", articles.len());
        Ok(articles)
    }

    async fn extract_full_text(&self, link: &Url) -> Result<String> {
        let bytes = self.fetch_page(link).await.map_err(Error::Extract)?;

        let html = String::from_utf8_lossy(&bytes);
        self.parse_article_body(&html)
            .ok_or_else(|| Error::Extract(format!("article body not found at {}", link)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> YahooFinanceSource {
        YahooFinanceSource::new(&SourceConfig::default()).unwrap()
    }

    const TOPIC_PAGE: &str = r#"
        <html><body><ul>
          <li class="stream-item">
            <h3>Stock X rallies after earnings beat</h3>
            <p>Shares of Stock X jumped in early trading.Most Read from Bloomberg: five other stories</p>
            <a href="/news/stock-x-rallies.html">read</a>
          </li>
          <li class="stream-item">
            <h3>Fed holds rates steady</h3>
            <p>The central bank left policy unchanged.</p>
            <a href="https://finance.yahoo.com/news/fed-holds.html">read</a>
          </li>
          <li class="stream-item">
            <h3>Ad item with no link</h3>
            <p>Sponsored.</p>
          </li>
        </ul></body></html>
    "#;

    #[test]
    fn parses_candidates_and_resolves_relative_links() {
        let articles = source().parse_candidates(TOPIC_PAGE);

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].headline, "Stock X rallies after earnings beat");
        assert_eq!(
            articles[0].link.as_str(),
            "https://finance.yahoo.com/news/stock-x-rallies.html"
        );
        assert_eq!(articles[1].headline, "Fed holds rates steady");
    }

    #[test]
    fn strips_description_boilerplate() {
        let articles = source().parse_candidates(TOPIC_PAGE);
        assert_eq!(
            articles[0].description,
            "Shares of Stock X jumped in early trading."
        );
    }

    #[test]
    fn respects_candidate_limit() {
        let config = SourceConfig {
            max_candidates: 1,
            ..SourceConfig::default()
        };
        let source = YahooFinanceSource::new(&config).unwrap();

        let articles = source.parse_candidates(TOPIC_PAGE);
        assert_eq!(articles.len(), 1);
    }

    #[test]
    fn extracts_body_paragraphs_and_strips_credit() {
        let html = r#"
            <html><body>
              <div class="caas-body">
                <p>Stock X rose five percent.</p>
                <p>Analysts raised their targets. (Reporting by A. Writer; editing by B. Editor)</p>
              </div>
            </body></html>
        "#;

        let body = source().parse_article_body(html).unwrap();
        assert_eq!(body, "Stock X rose five percent. Analysts raised their targets.");
    }

    #[test]
    fn missing_body_yields_none() {
        let html = "<html><body><div class='other'><p>nothing here</p></div></body></html>";
        assert!(source().parse_article_body(html).is_none());
    }
}
