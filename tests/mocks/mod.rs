#![allow(dead_code)]

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use slr_assistant::anthropic_client::TextCompleter;
use slr_assistant::config::{Config, ConfigLoader};
use slr_assistant::errors::AssistantError;

/// Answers with queued replies and records every prompt it was given.
pub struct MockCompleter {
    replies: Mutex<VecDeque<Result<String, AssistantError>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockCompleter {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(vec![]),
        }
    }

    pub fn add_reply(&self, reply: Result<String, AssistantError>) {
        self.replies.lock().push_back(reply);
    }

    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl TextCompleter for MockCompleter {
    async fn complete_text(&self, system: &str, user: &str) -> Result<String, AssistantError> {
        self.calls.lock().push((system.to_string(), user.to_string()));
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(AssistantError::ApiError("no reply queued".to_string())))
    }
}

pub struct InMemoryConfigLoader {
    config: Config,
}

impl InMemoryConfigLoader {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for InMemoryConfigLoader {
    fn load_config(&self) -> Result<Config, AssistantError> {
        Ok(self.config.clone())
    }
}
