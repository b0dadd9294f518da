//! Conversation node and output guards. One LLM exchange, validated by a
//! bounded retry loop so a malformed reply never reaches the client.

use std::collections::HashMap;

use formpilot_core::Action;
use formpilot_llm::{ChatMessage, ChatRole, LlmClient};
use formpilot_sessions::{Role, Session};
use tracing::warn;

use crate::guards::{Guard, GuardContext};
use crate::{json_extract, prompt};

const MAX_ATTEMPTS: u32 = 3;

pub async fn run(
    session: &Session,
    llm: &dyn LlmClient,
    field_tools: &HashMap<String, String>,
    guards: &[Box<dyn Guard>],
) -> Action {
    let system_prompt = prompt::build_conversation_prompt(session, field_tools);
    let base_history: Vec<ChatMessage> = session
        .conversation_history
        .iter()
        .map(|entry| ChatMessage { role: map_role(entry.role), content: entry.content.clone() })
        .collect();

    let missing = session.missing_fields();
    let ctx = GuardContext { answers: &session.answers, missing_fields: &missing, field_tools };

    let mut retry_note: Option<String> = None;

    for attempt in 0..MAX_ATTEMPTS {
        let mut history = base_history.clone();
        if let Some(note) = retry_note.take() {
            history.push(ChatMessage { role: ChatRole::System, content: note });
        }

        let text = match llm.complete(&system_prompt, &history).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, attempt, "llm transport error in conversation node");
                return fallback_message();
            }
        };

        let Some(value) = json_extract::extract_json(&text) else {
            retry_note = Some("Respond with ONLY the JSON object — no prose, no fences.".to_string());
            continue;
        };

        let kind = value.get("action").and_then(|v| v.as_str());
        let known_kind = kind.map(|k| Action::ALL_KINDS.contains(&k)).unwrap_or(false);
        if !known_kind {
            retry_note = Some(format!(
                "The only allowed values are: {}.",
                Action::ALL_KINDS.join(", ")
            ));
            continue;
        }

        let action: Action = match serde_json::from_value(value) {
            Ok(action) => action,
            Err(_) => {
                retry_note = Some("Respond with ONLY the JSON object — no prose, no fences.".to_string());
                continue;
            }
        };

        if let Some(message) = guards.iter().find_map(|g| g.check(&action, &ctx)) {
            retry_note = Some(message);
            continue;
        }

        return action;
    }

    fallback_message()
}

fn fallback_message() -> Action {
    Action::Message { text: "I had trouble understanding — please rephrase.".to_string() }
}

fn map_role(role: Role) -> ChatRole {
    match role {
        Role::System => ChatRole::System,
        Role::User => ChatRole::User,
        Role::Assistant => ChatRole::Assistant,
    }
}
