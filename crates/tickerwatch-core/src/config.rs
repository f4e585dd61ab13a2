use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub watch: WatchDefaults,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Startup values for the live watch settings. Keywords are overridden by
/// the persisted list when one exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchDefaults {
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Seconds between refresh cycles
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

impl Default for WatchDefaults {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            prompt: default_prompt(),
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// News listing page to scrape for candidate articles
    #[serde(default = "default_feed_url")]
    pub feed_url: String,
    /// Maximum candidate articles taken per fetch
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            max_candidates: default_max_candidates(),
            request_timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// AI provider: "gemini_api" or "openai"
    #[serde(default = "default_ai_provider")]
    pub provider: String,
    /// Gemini API key (for gemini_api provider)
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    /// Gemini model name
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    /// OpenAI API key (for openai provider)
    #[serde(default)]
    pub openai_api_key: Option<String>,
    /// OpenAI model name
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    /// Max tokens for a summary
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Sampling temperature for summaries
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: default_ai_provider(),
            gemini_api_key: None,
            gemini_model: default_gemini_model(),
            openai_api_key: None,
            openai_model: default_openai_model(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token used for posting messages
    #[serde(default)]
    pub bot_token: Option<String>,
    /// Destination channel id
    #[serde(default)]
    pub channel_id: Option<String>,
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tickerwatch")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_keywords() -> Vec<String> {
    vec!["stocks".to_string()]
}

fn default_prompt() -> String {
    "You are an expert financial analyst. Critically assess this text, \
summarize the important details in a few sentences, and note the likely \
effects of the event."
        .to_string()
}

fn default_refresh_interval() -> u64 {
    300
}

fn default_feed_url() -> String {
    "https://finance.yahoo.com/topic/stock-market-news/".to_string()
}

fn default_max_candidates() -> usize {
    5
}

fn default_timeout() -> u64 {
    30
}

fn default_ai_provider() -> String {
    "gemini_api".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_output_tokens() -> u32 {
    200
}

fn default_temperature() -> f32 {
    0.2
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("tickerwatch")
            .join("config.toml")
    }

    /// Get the database file path
    pub fn database_path(&self) -> PathBuf {
        self.general.data_dir.join("tickerwatch.db")
    }

    /// Get the Unix socket path for IPC
    pub fn socket_path(&self) -> PathBuf {
        self.general.data_dir.join("tickerwatch.sock")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = AppConfig::default();
        assert_eq!(config.watch.keywords, vec!["stocks"]);
        assert!(config.watch.refresh_interval_secs > 0);
        assert!(config.source.feed_url.starts_with("https://"));
        assert!(config.source.max_candidates > 0);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [watch]
            keywords = ["acme", "merger"]

            [ai]
            provider = "openai"
            "#,
        )
        .unwrap();

        assert_eq!(config.watch.keywords, vec!["acme", "merger"]);
        assert_eq!(config.watch.refresh_interval_secs, 300);
        assert_eq!(config.ai.provider, "openai");
        assert_eq!(config.ai.max_output_tokens, 200);
    }
}
