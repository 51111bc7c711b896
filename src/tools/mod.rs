//! Functions the chat model may call. Every tool answers with a string the
//! model reads back; failures are reported as `{"error": "..."}` JSON rather
//! than aborting the turn.

mod pico;
mod pubmed_count;
mod search;
mod strategy;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::anthropic_client::{AnthropicClient, TextCompleter};
use crate::config::Config;
use crate::models::request::ToolDefinition;
use crate::pubmed::EutilsClient;

pub use pico::PicoTool;
pub use pubmed_count::PubMedCountTool;
pub use search::{SearchTool, remove_data_images};
pub use strategy::SearchStrategyTool;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn definition(&self) -> ToolDefinition;

    async fn execute(&self, args: Value) -> String;
}

pub fn error_json(message: impl Into<String>) -> String {
    json!({ "error": message.into() }).to_string()
}

/// Reads a required string argument.
pub(crate) fn string_arg<'a>(args: &'a Value, name: &str) -> Result<&'a str, String> {
    match args.get(name).and_then(Value::as_str) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(format!("missing required argument: {}", name)),
    }
}

#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.retain(|existing| existing.name() != tool.name());
        self.tools.push(tool);
    }

    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|tool| tool.definition()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    /// Runs the named tool with the model's raw JSON arguments.
    pub async fn dispatch(&self, name: &str, raw_arguments: &str) -> String {
        let Some(tool) = self.tools.iter().find(|tool| tool.name() == name) else {
            log::warn!("model requested unknown tool {}", name);
            return error_json(format!("Unknown function {}", name));
        };

        let args: Value = if raw_arguments.trim().is_empty() {
            json!({})
        } else {
            match serde_json::from_str(raw_arguments) {
                Ok(args) => args,
                Err(e) => {
                    log::error!("Error processing tool call {}: {}", name, e);
                    return error_json(e.to_string());
                }
            }
        };

        log::info!("running tool {}", name);
        tool.execute(args).await
    }
}

/// The tools offered to the search strategy agent.
pub fn default_registry(client: &reqwest::Client, config: &Config) -> ToolRegistry {
    let anthropic: Arc<dyn TextCompleter> = Arc::new(AnthropicClient::new(
        client.clone(),
        config.anthropic.clone(),
    ));
    let eutils = EutilsClient::new(client.clone(), config.pubmed.clone());

    ToolRegistry::new()
        .with(Arc::new(SearchTool::new(client.clone(), config.search.clone())))
        .with(Arc::new(PicoTool::new(anthropic.clone())))
        .with(Arc::new(SearchStrategyTool::new(anthropic)))
        .with(Arc::new(PubMedCountTool::new(eutils)))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn definition(&self) -> ToolDefinition {
            ToolDefinition::function("echo", "Echo the text.", json!({"type": "object"}))
        }

        async fn execute(&self, args: Value) -> String {
            match string_arg(&args, "text") {
                Ok(text) => text.to_string(),
                Err(e) => error_json(e),
            }
        }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::new().with(Arc::new(EchoTool))
    }

    #[tokio::test]
    async fn test_dispatch_known_tool() {
        let out = registry().dispatch("echo", r#"{"text": "hi"}"#).await;
        assert_eq!(out, "hi");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let out = registry().dispatch("nope", "{}").await;
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["error"], "Unknown function nope");
    }

    #[tokio::test]
    async fn test_dispatch_bad_arguments() {
        let out = registry().dispatch("echo", "{not json").await;
        let value: Value = serde_json::from_str(&out).unwrap();
        assert!(value["error"].as_str().unwrap().len() > 0);
    }

    #[tokio::test]
    async fn test_missing_argument() {
        let out = registry().dispatch("echo", "").await;
        assert_eq!(out, error_json("missing required argument: text"));
    }

    #[test]
    fn test_default_registry_order() {
        let registry = default_registry(&reqwest::Client::new(), &Config::default());
        assert_eq!(
            registry.names(),
            vec!["search_tool", "pico_tool", "search_strategy_tool", "pubmed_count_tool"]
        );
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = registry();
        registry.register(Arc::new(EchoTool));
        assert_eq!(registry.names(), vec!["echo"]);
        assert_eq!(registry.definitions().len(), 1);
    }
}
