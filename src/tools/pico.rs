use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{Tool, error_json, string_arg};
use crate::anthropic_client::TextCompleter;
use crate::models::request::ToolDefinition;
use crate::prompts;

pub struct PicoTool {
    completer: Arc<dyn TextCompleter>,
}

impl PicoTool {
    pub fn new(completer: Arc<dyn TextCompleter>) -> Self {
        Self { completer }
    }
}

#[async_trait]
impl Tool for PicoTool {
    fn name(&self) -> &str {
        "pico_tool"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            self.name(),
            "Generate a PICO framework using Claude.",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The query for PICO framework generation."
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
        match self.completer.complete_text(prompts::PICO_SYSTEM, query).await {
            Ok(text) => text,
            Err(e) => error_json(format!("Failed to generate PICO: {}", e)),
        }
    }
}
