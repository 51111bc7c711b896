use serde::{self, Deserialize, Serialize};

use crate::models::request::Message;

/// What the chat page receives for one user turn, in order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    Message { author: String, content: String },
    ToolStep { name: String, input: String, output: String },
    Error { message: String },
    Done,
}

impl ChatEvent {
    pub fn to_sse(&self) -> String {
        // serializing a plain enum of strings cannot fail
        let json = serde_json::to_string(self).unwrap_or_default();
        format!("data: {}\n\n", json)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Starter {
    pub label: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateSession {
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionCreated {
    pub session_id: String,
    pub mode: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionHistory {
    pub session_id: String,
    pub mode: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserMessage {
    pub content: String,
    #[serde(default)]
    pub stream: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TurnResult {
    pub events: Vec<ChatEvent>,
}
