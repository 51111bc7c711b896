use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{Tool, error_json, string_arg};
use crate::anthropic_client::TextCompleter;
use crate::models::request::ToolDefinition;
use crate::prompts;

/// Turns key concepts into a numbered PubMed search table in markdown.
pub struct SearchStrategyTool {
    completer: Arc<dyn TextCompleter>,
}

impl SearchStrategyTool {
    pub fn new(completer: Arc<dyn TextCompleter>) -> Self {
        Self { completer }
    }
}

#[async_trait]
impl Tool for SearchStrategyTool {
    fn name(&self) -> &str {
        "search_strategy_tool"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            self.name(),
            "Build a PubMed/MEDLINE search strategy table from key concepts, their synonyms and MeSH terms.",
            json!({
                "type": "object",
                "properties": {
                    "concepts": {
                        "type": "string",
                        "description": "Key concepts with their synonyms, MeSH terms and any filters."
                    }
                },
                "required": ["concepts"]
            }),
        )
    }

    async fn execute(&self, args: Value) -> String {
        let concepts = match string_arg(&args, "concepts") {
            Ok(concepts) => concepts,
            Err(e) => return error_json(e),
        };
        let prompt = prompts::strategy_user_prompt(concepts);
        match self
            .completer
            .complete_text(prompts::SEARCH_STRATEGY_TABLE_SYSTEM, &prompt)
            .await
        {
            Ok(table) => table,
            Err(e) => error_json(format!("Failed to generate search strategy: {}", e)),
        }
    }
}
