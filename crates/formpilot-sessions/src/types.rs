use std::collections::HashMap;

use chrono::{DateTime, Utc};
use formpilot_core::FieldType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One entry in a session's append-only conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

impl HistoryEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }
}

/// Per-conversation state, mutated across turns.
///
/// Fields here are exactly the persisted state; ephemeral per-turn values
/// (the incoming user message, tool results, the parsed LLM response) are
/// *not* stored here — they live in `formpilot_orchestrator::turn::TurnInput`
/// and are constructed fresh every turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,

    /// Immutable after session creation.
    pub form_context_md: String,

    /// Determined once, at session creation, from `form_context_md`.
    pub required_fields: Vec<String>,

    /// Complete for every required field.
    pub field_types: HashMap<String, FieldType>,

    pub answers: HashMap<String, Value>,

    pub conversation_history: Vec<HistoryEntry>,

    pub initial_extraction_done: bool,

    pub pending_field_id: Option<String>,
    /// The `ASK_*` kind string (e.g. `"ASK_DATE"`), set iff `pending_field_id` is.
    pub pending_action_type: Option<String>,

    pub pending_text_value: Option<String>,
    pub pending_text_field_id: Option<String>,

    pub pending_tool_name: Option<String>,

    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,

    /// Observability counter, not part of the wire contract, bumped once
    /// per completed turn.
    pub turn_count: u32,
}

impl Session {
    pub fn new(id: String, form_context_md: String, required_fields: Vec<String>, field_types: HashMap<String, FieldType>) -> Self {
        let now = Utc::now();
        Self {
            id,
            form_context_md,
            required_fields,
            field_types,
            answers: HashMap::new(),
            conversation_history: Vec::new(),
            initial_extraction_done: false,
            pending_field_id: None,
            pending_action_type: None,
            pending_text_value: None,
            pending_text_field_id: None,
            pending_tool_name: None,
            created_at: now,
            last_accessed_at: now,
            turn_count: 0,
        }
    }

    pub fn touch(&mut self) {
        self.last_accessed_at = Utc::now();
    }

    pub fn is_expired(&self, ttl: chrono::Duration) -> bool {
        Utc::now() - self.last_accessed_at > ttl
    }

    /// True once every required field has a stored answer.
    pub fn all_required_present(&self) -> bool {
        self.required_fields.iter().all(|f| self.answers.contains_key(f))
    }

    pub fn missing_fields(&self) -> Vec<String> {
        self.required_fields
            .iter()
            .filter(|f| !self.answers.contains_key(f.as_str()))
            .cloned()
            .collect()
    }

    pub fn clear_pending_ask(&mut self) {
        self.pending_field_id = None;
        self.pending_action_type = None;
    }

    pub fn clear_pending_text(&mut self) {
        self.pending_text_value = None;
        self.pending_text_field_id = None;
    }
}
