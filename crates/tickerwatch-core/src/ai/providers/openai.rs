use async_openai::{
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};

use super::{truncate_chars, AiProvider};
use crate::{Error, Result};

const MAX_INPUT_CHARS: usize = 4000;

/// OpenAI API provider
pub struct OpenAiProvider {
    client: Client<async_openai::config::OpenAIConfig>,
    model: String,
    max_output_tokens: u32,
    temperature: f32,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, model: &str, max_output_tokens: u32, temperature: f32) -> Self {
        let config = async_openai::config::OpenAIConfig::new().with_api_key(api_key);
        let client = Client::with_config(config);

        Self {
            client,
            model: model.to_string(),
            max_output_tokens,
            temperature,
        }
    }
}

#[async_trait::async_trait]
impl AiProvider for OpenAiProvider {
    async fn summarize(&self, content: &str, prompt: &str) -> Result<String> {
        let truncated = truncate_chars(content, MAX_INPUT_CHARS);

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(format!("{}\n\n{}", prompt, truncated))
                    .build()
                    .map_err(|e| Error::Summarize(e.to_string()))?,
            )])
            .max_tokens(self.max_output_tokens)
            .temperature(self.temperature)
            .build()
            .map_err(|e| Error::Summarize(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| Error::Summarize(e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        Ok(content)
    }
}
