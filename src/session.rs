use std::collections::HashMap;

use parking_lot::RwLock;
use phf::phf_map;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AssistantError;
use crate::models::request::Message;
use crate::prompts;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssistantMode {
    #[default]
    SearchStrategy,
    SearchQuery,
    Screening,
}

static MODES: phf::Map<&'static str, AssistantMode> = phf_map! {
    "search_strategy" => AssistantMode::SearchStrategy,
    "strategy" => AssistantMode::SearchStrategy,
    "search_query" => AssistantMode::SearchQuery,
    "query" => AssistantMode::SearchQuery,
    "screening" => AssistantMode::Screening,
    "screen" => AssistantMode::Screening,
};

impl AssistantMode {
    pub const ALL: [AssistantMode; 3] = [
        AssistantMode::SearchStrategy,
        AssistantMode::SearchQuery,
        AssistantMode::Screening,
    ];

    pub fn from_slug(slug: &str) -> Option<AssistantMode> {
        MODES.get(slug.trim().to_ascii_lowercase().as_str()).copied()
    }

    pub fn slug(&self) -> &'static str {
        match self {
            AssistantMode::SearchStrategy => "search_strategy",
            AssistantMode::SearchQuery => "search_query",
            AssistantMode::Screening => "screening",
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            AssistantMode::SearchStrategy => prompts::SEARCH_STRATEGY_AGENT_SYSTEM,
            AssistantMode::SearchQuery => prompts::SEARCH_QUERY_SYSTEM,
            AssistantMode::Screening => prompts::SCREENING_SYSTEM,
        }
    }

    /// Only the strategy agent is offered tools.
    pub fn uses_tools(&self) -> bool {
        matches!(self, AssistantMode::SearchStrategy)
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub mode: AssistantMode,
    pub messages: Vec<Message>,
    busy: bool,
}

/// In-memory chat sessions. Nothing here outlives the process.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, mode: AssistantMode) -> Uuid {
        let id = Uuid::new_v4();
        let session = Session {
            id,
            mode,
            messages: vec![Message::system(mode.system_prompt())],
            busy: false,
        };
        self.sessions.write().insert(id, session);
        log::debug!("session {} created in mode {}", id, mode.slug());
        id
    }

    pub fn get(&self, id: Uuid) -> Result<Session, AssistantError> {
        self.sessions
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    pub fn history(&self, id: Uuid) -> Result<Vec<Message>, AssistantError> {
        Ok(self.get(id)?.messages)
    }

    pub fn append<I>(&self, id: Uuid, messages: I) -> Result<(), AssistantError>
    where
        I: IntoIterator<Item = Message>,
    {
        let mut sessions = self.sessions.write();
        let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        session.messages.extend(messages);
        Ok(())
    }

    pub fn remove(&self, id: Uuid) -> Result<(), AssistantError> {
        self.sessions
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Marks the session as running a turn. A session runs one turn at a time.
    pub(crate) fn try_begin_turn(&self, id: Uuid) -> Result<(), AssistantError> {
        let mut sessions = self.sessions.write();
        let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        if session.busy {
            return Err(AssistantError::ValidationError(format!(
                "session {} is already processing a message",
                id
            )));
        }
        session.busy = true;
        Ok(())
    }

    pub(crate) fn end_turn(&self, id: Uuid) {
        if let Some(session) = self.sessions.write().get_mut(&id) {
            session.busy = false;
        }
    }
}

fn not_found(id: Uuid) -> AssistantError {
    AssistantError::NotFound(format!("session {}", id))
}

pub fn parse_session_id(raw: &str) -> Result<Uuid, AssistantError> {
    Uuid::parse_str(raw).map_err(|_| AssistantError::NotFound(format!("session {}", raw)))
}
