use std::time::Duration;

use anyhow::{anyhow, Context};
use async_openai::{
    config::OpenAIConfig,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;

use crate::configuration::ProviderSettings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Black-box text completion. Returns an empty string when the provider
/// answered without content.
#[async_trait]
pub trait TextProvider: Send + Sync {
    async fn complete(&self, prompt: &str, options: CompletionOptions) -> anyhow::Result<String>;
}

pub struct OpenaiClient {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
    max_retries: u32,
    backoff: Duration,
}

impl OpenaiClient {
    pub fn new(api_key: String, settings: &ProviderSettings) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        OpenaiClient {
            client: Client::with_config(config),
            model: settings.model.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
            max_retries: settings.max_retries,
            backoff: Duration::from_millis(settings.backoff_millis),
        }
    }

    async fn complete_once(&self, prompt: &str, options: CompletionOptions) -> anyhow::Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages([ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into()])
            .temperature(options.temperature)
            .max_tokens(options.max_tokens)
            .build()?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| anyhow!("openai request timed out after {:?}", self.timeout))?
            .context("openai chat completion failed")?;

        log::debug!("Response: {:?}", response);

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl TextProvider for OpenaiClient {
    async fn complete(&self, prompt: &str, options: CompletionOptions) -> anyhow::Result<String> {
        let mut attempt = 0;

        loop {
            match self.complete_once(prompt, options).await {
                Ok(text) => return Ok(text),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    log::error!("Openai attempt {} failed, retrying: {:?}", attempt, e);
                    tokio::time::sleep(self.backoff * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Removes a surrounding markdown code fence (```json ... ```), if any.
pub fn strip_code_fences(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```JSON")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Cuts `text` to at most `max_bytes` bytes without splitting a character.
pub fn truncate_to_char_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
