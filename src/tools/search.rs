use async_trait::async_trait;
use serde_json::{Value, json};

use super::{Tool, error_json, string_arg};
use crate::config::SearchConfig;
use crate::models::request::ToolDefinition;

pub struct SearchTool {
    client: reqwest::Client,
    config: SearchConfig,
}

impl SearchTool {
    pub fn new(client: reqwest::Client, config: SearchConfig) -> Self {
        Self { client, config }
    }

    async fn search(&self, query: &str, engine: &str) -> String {
        if self.config.api_key.is_empty() {
            return error_json("SEARCH_API_KEY not found in environment variables.");
        }

        let response = self
            .client
            .get(&self.config.api_url)
            .query(&[
                ("engine", engine),
                ("q", query),
                ("api_key", self.config.api_key.as_str()),
            ])
            .send()
            .await;
        let response = match response {
            Ok(response) => response,
            Err(e) => return error_json(format!("HTTP request failed: {}", e)),
        };

        if response.status() != reqwest::StatusCode::OK {
            return error_json(format!(
                "Request failed with status code {}.",
                response.status().as_u16()
            ));
        }

        let data: Value = match response.json().await {
            Ok(data) => data,
            Err(_) => return error_json("Failed to parse JSON response."),
        };

        let is_empty = match &data {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        };
        if is_empty {
            return error_json("No data returned from the search API.");
        }

        let cleaned = remove_data_images(data);
        serde_json::to_string_pretty(&cleaned).unwrap_or_else(|e| error_json(e.to_string()))
    }
}

/// Drops every object entry whose value is an inline `data:image/` URI, at
/// any depth. Search results embed thumbnails that way and they are useless
/// to the model.
pub fn remove_data_images(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !matches!(v, Value::String(s) if s.starts_with("data:image/")))
                .map(|(k, v)| (k, remove_data_images(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(remove_data_images).collect()),
        other => other,
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "search_tool"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            self.name(),
            "Perform a web search using the specified query and engine.",
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "The search query string."},
                    "engine": {
                        "type": "string",
                        "enum": ["google"],
                        "description": "The search engine to use."
                    }
                },
                "required": ["query"]
            }),
        )
    }

    async fn execute(&self, args: Value) -> String {
        let query = match string_arg(&args, "query") {
            Ok(query) => query,
            Err(e) => return error_json(e),
        };
        let engine = args
            .get("engine")
            .and_then(Value::as_str)
            .unwrap_or(&self.config.engine);
        self.search(query, engine).await
    }
}
