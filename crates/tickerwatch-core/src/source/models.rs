use url::Url;

/// A candidate article scraped from the news feed. Built per fetch and
/// discarded after the pipeline run unless it produces a notification.
#[derive(Debug, Clone)]
pub struct Article {
    pub headline: String,
    pub description: String,
    pub link: Url,
    /// Extracted body text, filled in by the pipeline before summarization
    pub source_text: Option<String>,
}

impl Article {
    pub fn new(headline: impl Into<String>, description: impl Into<String>, link: Url) -> Self {
        Self {
            headline: headline.into(),
            description: description.into(),
            link,
            source_text: None,
        }
    }

    /// Case-insensitive substring match of the keyword against the
    /// headline or the description.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let keyword = keyword.to_lowercase();
        self.headline.to_lowercase().contains(&keyword)
            || self.description.to_lowercase().contains(&keyword)
    }
}
