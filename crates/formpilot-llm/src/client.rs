use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single message in the conversation passed to the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP transport error: {0}")]
    Transport(String),

    #[error("LLM call timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("LLM API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("unexpected LLM response shape: {0}")]
    Parse(String),
}

/// `Complete(systemPrompt, history) -> text` — the LLM connector's external
/// interface.
///
/// Implementations make exactly one call per invocation; no retry logic
/// lives here — retries live in guards.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system_prompt: &str, history: &[ChatMessage]) -> Result<String, LlmError>;
}
