use actix_web::mime;
use async_trait::async_trait;
use reqwest::Response;

use crate::errors::AssistantError;
use crate::models::request;
use crate::models::response::ChatCompletion;

#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(
        &self,
        request: request::ChatCompletionCreate,
    ) -> Result<ChatCompletion, AssistantError>;
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct LLMClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl LLMClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub(crate) async fn request_chat_completion(
        &self,
        request: &request::ChatCompletionCreate,
        expected_content_type: mime::Mime,
    ) -> Result<Response, AssistantError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, "/chat/completions"))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await?;

        check_response(response, expected_content_type).await
    }
}

#[async_trait]
impl ChatBackend for LLMClient {
    async fn complete(
        &self,
        request: request::ChatCompletionCreate,
    ) -> Result<ChatCompletion, AssistantError> {
        log::debug!(
            "chat completion: model {}, {} messages",
            request.model,
            request.messages.len()
        );
        let response = self
            .request_chat_completion(&request, mime::APPLICATION_JSON)
            .await?;
        let completion: ChatCompletion = response.json().await?;

        if completion.choices.is_empty() {
            return Err(AssistantError::ApiError(
                "error: completion has no choices".to_string(),
            ));
        }
        if let Some(usage) = &completion.usage {
            log::debug!(
                "usage: prompt {}, completion {}",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        Ok(completion)
    }
}

/// Turns a non-success status or unexpected content type into an error.
pub(crate) async fn check_response(
    response: Response,
    expected_content_type: mime::Mime,
) -> Result<Response, AssistantError> {
    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        return Err(AssistantError::ApiError(format!(
            "error: status {status}, text {text}"
        )));
    }

    let content_type: mime::Mime = match response.headers().get(reqwest::header::CONTENT_TYPE) {
        Some(value) => value.to_str()?.parse()?,
        None => {
            return Err(AssistantError::ParseError(
                "error: response has no content-type".to_string(),
            ));
        }
    };
    if content_type.essence_str() != expected_content_type.essence_str() {
        return Err(AssistantError::ParseError(format!(
            "content-type: {content_type}, expected: {expected_content_type}"
        )));
    }

    Ok(response)
}
