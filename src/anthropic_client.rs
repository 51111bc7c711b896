use actix_web::mime;
use async_trait::async_trait;

use crate::config::AnthropicConfig;
use crate::consts;
use crate::errors::AssistantError;
use crate::llm_client::check_response;
use crate::models::anthropic::{AnthropicError, AnthropicMessage, MessagesCreate, MessagesResponse};

/// A single-shot "system + user -> text" completion. The PICO, strategy and
/// screening steps only need this much of a model.
#[async_trait]
pub trait TextCompleter: Send + Sync {
    async fn complete_text(&self, system: &str, user: &str) -> Result<String, AssistantError>;
}

pub struct AnthropicClient {
    client: reqwest::Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(client: reqwest::Client, config: AnthropicConfig) -> Self {
        Self { client, config }
    }

    fn build_request(&self, system: &str, user: &str) -> MessagesCreate {
        MessagesCreate {
            model: self.config.model.clone(),
            system: system.to_string(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: user.to_string(),
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }
}

#[async_trait]
impl TextCompleter for AnthropicClient {
    async fn complete_text(&self, system: &str, user: &str) -> Result<String, AssistantError> {
        if self.config.api_key.is_empty() {
            return Err(AssistantError::ConfigError(
                "ANTHROPIC_API_KEY not found in environment variables".to_string(),
            ));
        }

        let request = self.build_request(system, user);
        let response = self
            .client
            .post(format!(
                "{}/v1/messages",
                self.config.api_url.trim_end_matches('/')
            ))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", consts::ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<AnthropicError>(&text) {
                Ok(error) => String::from(error.error),
                Err(_) => text,
            };
            return Err(AssistantError::ApiError(format!(
                "error: status {status}, {detail}"
            )));
        }

        let response = check_response(response, mime::APPLICATION_JSON).await?;
        let message: MessagesResponse = response.json().await?;
        log::debug!(
            "anthropic {}: {} in, {} out",
            message.model,
            message.usage.input_tokens,
            message.usage.output_tokens
        );

        let text = message.text();
        if text.is_empty() {
            return Err(AssistantError::ApiError(
                "error: response contained no text".to_string(),
            ));
        }
        Ok(text)
    }
}
