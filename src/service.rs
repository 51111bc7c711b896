use std::sync::Arc;

use actix_web::web::Bytes;
use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::consts;
use crate::errors::AssistantError;
use crate::llm_client::ChatBackend;
use crate::models::events::ChatEvent;
use crate::models::request::{self, Message, MessageAssistant};
use crate::session::{AssistantMode, SessionStore};
use crate::tools::ToolRegistry;

/// Where the events of a turn go as they happen.
#[async_trait]
pub trait EventSink: Send {
    async fn emit(&mut self, event: ChatEvent) -> Result<(), AssistantError>;
}

#[async_trait]
impl EventSink for Vec<ChatEvent> {
    async fn emit(&mut self, event: ChatEvent) -> Result<(), AssistantError> {
        self.push(event);
        Ok(())
    }
}

#[async_trait]
impl EventSink for mpsc::Sender<Result<Bytes, AssistantError>> {
    async fn emit(&mut self, event: ChatEvent) -> Result<(), AssistantError> {
        self.send(Ok(Bytes::from(event.to_sse())))
            .await
            .map_err(|_| AssistantError::NetworkError("client disconnected".to_string()))
    }
}

/// Clears the session's busy flag however the turn ends.
struct TurnGuard<'a> {
    sessions: &'a SessionStore,
    id: Uuid,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.sessions.end_turn(self.id);
    }
}

pub struct AssistantService {
    backend: Arc<dyn ChatBackend>,
    tools: ToolRegistry,
    sessions: Arc<SessionStore>,
    model: String,
    max_tool_rounds: u32,
}

impl AssistantService {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        tools: ToolRegistry,
        sessions: Arc<SessionStore>,
        model: &str,
    ) -> Self {
        Self {
            backend,
            tools,
            sessions,
            model: model.to_string(),
            max_tool_rounds: consts::DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_max_tool_rounds(mut self, max_tool_rounds: u32) -> Self {
        self.max_tool_rounds = max_tool_rounds;
        self
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    fn build_request(
        &self,
        mode: AssistantMode,
        messages: Vec<Message>,
        round: u32,
    ) -> request::ChatCompletionCreate {
        let request = request::ChatCompletionCreate::new(&self.model, messages);
        if mode.uses_tools() && round < self.max_tool_rounds {
            request.with_tools(self.tools.definitions())
        } else {
            request
        }
    }

    /// Runs one user turn against the session and reports its events to
    /// `sink`, ending with `done`. The session history is only updated when
    /// the turn completes.
    pub async fn run_turn<S: EventSink + ?Sized>(
        &self,
        session_id: Uuid,
        content: &str,
        sink: &mut S,
    ) -> Result<(), AssistantError> {
        if content.trim().is_empty() {
            return Err(AssistantError::ValidationError(
                "error: empty message".to_string(),
            ));
        }

        self.sessions.try_begin_turn(session_id)?;
        let _guard = TurnGuard {
            sessions: &self.sessions,
            id: session_id,
        };

        let session = self.sessions.get(session_id)?;
        let mut messages = session.messages;
        let history_len = messages.len();
        messages.push(Message::user(content));

        let mut round = 0;
        loop {
            let request = self.build_request(session.mode, messages.clone(), round);
            let offered_tools = request.tools.is_some();

            let completion = self.backend.complete(request).await?;
            let reply = completion
                .first_message()
                .cloned()
                .ok_or_else(|| AssistantError::ApiError("error: empty completion".to_string()))?;

            if let Some(text) = reply.content.as_deref().filter(|text| !text.is_empty()) {
                sink.emit(ChatEvent::Message {
                    author: consts::ASSISTANT_AUTHOR.to_string(),
                    content: text.to_string(),
                })
                .await?;
            }

            if !(offered_tools && reply.has_tool_calls()) {
                messages.push(Message::Assistant(MessageAssistant {
                    content: Some(reply.content.unwrap_or_default()),
                    tool_calls: None,
                }));
                break;
            }

            let calls = reply.tool_calls.clone().unwrap_or_default();
            messages.push(Message::Assistant(reply));
            for call in calls {
                let output = self
                    .tools
                    .dispatch(&call.function.name, &call.function.arguments)
                    .await;
                sink.emit(ChatEvent::ToolStep {
                    name: call.function.name.clone(),
                    input: call.function.arguments.clone(),
                    output: output.clone(),
                })
                .await?;
                messages.push(Message::tool(&call.id, &call.function.name, output));
            }
            round += 1;
        }

        self.sessions
            .append(session_id, messages.into_iter().skip(history_len))?;
        sink.emit(ChatEvent::Done).await
    }

    pub async fn run_turn_collect(
        &self,
        session_id: Uuid,
        content: &str,
    ) -> Result<Vec<ChatEvent>, AssistantError> {
        let mut events = vec![];
        self.run_turn(session_id, content, &mut events).await?;
        Ok(events)
    }

    /// Streams the turn as SSE frames. A failure is reported as an `error`
    /// event followed by `done`.
    pub async fn stream_turn(
        &self,
        session_id: Uuid,
        content: &str,
        mut sender: mpsc::Sender<Result<Bytes, AssistantError>>,
    ) -> Result<(), AssistantError> {
        let result = self.run_turn(session_id, content, &mut sender).await;
        if let Err(e) = &result {
            log::error!("turn for session {} failed: {}", session_id, e);
            sender
                .emit(ChatEvent::Error {
                    message: e.to_string(),
                })
                .await?;
            sender.emit(ChatEvent::Done).await?;
        }
        result
    }
}
