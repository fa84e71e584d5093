use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{CompletionConfig, CompletionProvider};
use crate::error::{IntelligenceError, IntelligenceResult};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API client
pub struct AnthropicProvider {
    client: Client,
    config: CompletionConfig,
}

impl AnthropicProvider {
    pub fn new(config: CompletionConfig) -> IntelligenceResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn complete(&self, system: &str, prompt: &str) -> IntelligenceResult<String> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            IntelligenceError::NotConfigured("ANTHROPIC_API_KEY not configured".to_string())
        })?;

        debug!(
            prompt_length = prompt.len(),
            model = %self.config.model,
            "Sending completion request"
        );

        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(IntelligenceError::Completion(format!(
                "Anthropic API error ({}): {}",
                status, error_text
            )));
        }

        let body: MessagesResponse = response.json().await?;

        info!(
            input_tokens = body.usage.input_tokens,
            output_tokens = body.usage.output_tokens,
            model = %self.config.model,
            "Completion finished"
        );

        let text: String = body
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect();

        if text.is_empty() {
            warn!(model = %self.config.model, "Completion returned no text content");
        }

        Ok(text)
    }
}
