use async_trait::async_trait;
use serde_json::{Value, json};

use super::{Tool, error_json, string_arg};
use crate::models::request::ToolDefinition;
use crate::pubmed::EutilsClient;

pub struct PubMedCountTool {
    client: EutilsClient,
}

impl PubMedCountTool {
    pub fn new(client: EutilsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for PubMedCountTool {
    fn name(&self) -> &str {
        "pubmed_count_tool"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            self.name(),
            "Count how many PubMed records a search string returns.",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "A PubMed search string, field tags and Boolean operators allowed."
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
        match self.client.count(query).await {
            Ok(count) => json!({ "query": query, "count": count }).to_string(),
            Err(e) => error_json(format!("PubMed search failed: {}", e)),
        }
    }
}
