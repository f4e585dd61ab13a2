mod gemini_api;
mod openai;

pub use gemini_api::GeminiApiProvider;
pub use openai::OpenAiProvider;

use crate::Result;

/// Trait for text summarization providers.
///
/// The prompt is an argument rather than provider state: operators edit it
/// at runtime and each refresh cycle carries its own copy.
#[async_trait::async_trait]
pub trait AiProvider: Send + Sync {
    /// Condense the given text according to the prompt.
    async fn summarize(&self, content: &str, prompt: &str) -> Result<String>;
}

/// Truncate a string to at most `max_chars` characters on a char boundary.
pub(crate) fn truncate_chars(input: &str, max_chars: usize) -> &str {
    match input.char_indices().nth(max_chars) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }
}
