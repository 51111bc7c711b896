#![allow(dead_code)]

use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use slr_assistant::config::Config;
use slr_assistant::llm_client::LLMClient;
use slr_assistant::service::AssistantService;
use slr_assistant::session::SessionStore;
use slr_assistant::tools::{self, ToolRegistry};

/// Config pointing every upstream at `base_url`, with keys set and no
/// pacing delays.
pub fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.openai.api_url = base_url.to_string();
    config.openai.api_key = "test-openai-key".to_string();
    config.anthropic.api_url = base_url.to_string();
    config.anthropic.api_key = "test-anthropic-key".to_string();
    config.search.api_url = format!("{}/api/v1/search", base_url);
    config.search.api_key = "test-search-key".to_string();
    config.pubmed.eutils_url = base_url.to_string();
    config.pubmed.api_key = "test-pubmed-key".to_string();
    config.pubmed.delay_ms = 0;
    config.pubmed.backoff_secs = 0.0;
    config.pmc.articles_url = format!("{}/pmc/articles", base_url);
    config.pmc.oa_list_url = format!("{}/pub/pmc/oa_non_comm_use_pdf.csv", base_url);
    config.pmc.delay_ms = 0;
    config
}

pub fn create_service_with_tools(config: &Config, tools: ToolRegistry) -> Arc<AssistantService> {
    let http_client = Client::new();
    let backend = Arc::new(LLMClient::new(
        http_client,
        &config.openai.api_url,
        &config.openai.api_key,
    ));
    Arc::new(
        AssistantService::new(
            backend,
            tools,
            Arc::new(SessionStore::new()),
            &config.openai.model,
        )
        .with_max_tool_rounds(config.assistant.max_tool_rounds),
    )
}

pub fn create_service(config: &Config) -> Arc<AssistantService> {
    create_service_with_tools(config, tools::default_registry(&Client::new(), config))
}

pub async fn setup_chat_completion_mock(status: u16, body: impl Into<Value>) -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body.into()))
        .mount(&mock_server)
        .await;

    mock_server
}

/// First completion asks for a tool, every later one answers.
pub async fn mount_tool_round(mock_server: &MockServer, tool_call: Value, answer: Value) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tool_call))
        .up_to_n_times(1)
        .mount(mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer))
        .mount(mock_server)
        .await;
}
