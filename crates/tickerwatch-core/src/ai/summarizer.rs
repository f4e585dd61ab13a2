use std::sync::Arc;

use super::providers::{AiProvider, GeminiApiProvider, OpenAiProvider};
use crate::config::AppConfig;
use crate::Result;

/// Summarizer that wraps the configured provider
pub struct Summarizer {
    provider: Arc<dyn AiProvider>,
}

impl Summarizer {
    /// Create a new summarizer based on configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let max_output_tokens = config.ai.max_output_tokens.max(1);
        let temperature = config.ai.temperature;

        let provider: Arc<dyn AiProvider> = match config.ai.provider.as_str() {
            "openai" => {
                let api_key = config.ai.openai_api_key.as_ref().ok_or_else(|| {
                    crate::Error::Config("OpenAI API key not configured".to_string())
                })?;
                Arc::new(OpenAiProvider::new(
                    api_key,
                    &config.ai.openai_model,
                    max_output_tokens,
                    temperature,
                ))
            }
            "gemini_api" | _ => {
                let api_key = config.ai.gemini_api_key.as_ref().ok_or_else(|| {
                    crate::Error::Config("Gemini API key not configured".to_string())
                })?;
                Arc::new(GeminiApiProvider::new(
                    api_key,
                    &config.ai.gemini_model,
                    max_output_tokens,
                    temperature,
                ))
            }
        };

        Ok(Self { provider })
    }

    /// Wrap an existing provider directly
    pub fn with_provider(provider: Arc<dyn AiProvider>) -> Self {
        Self { provider }
    }

    /// Generate a summary of the content using the given prompt
    pub async fn summarize(&self, content: &str, prompt: &str) -> Result<String> {
        self.provider.summarize(content, prompt).await
    }
}
