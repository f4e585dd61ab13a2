pub mod models;
pub mod yahoo;

pub use models::Article;
pub use yahoo::YahooFinanceSource;

use url::Url;

use crate::Result;

/// Supplies candidate articles and their full text.
///
/// `fetch_candidates` is keyword-agnostic and idempotent; callers filter
/// the returned list themselves. Both methods fail with the corresponding
/// error variant and never panic; timeouts are the adapter's concern.
#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch a bounded list of candidate articles from the news feed.
    async fn fetch_candidates(&self) -> Result<Vec<Article>>;

    /// Fetch the linked page and extract the article body text.
    async fn extract_full_text(&self, link: &Url) -> Result<String>;
}
