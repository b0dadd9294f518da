//! Ephemeral per-turn state. None of this is part of `Session`; it is
//! constructed fresh for every `graph::run_turn` call and discarded
//! afterward.

use serde_json::Value;

/// One client-supplied tool result, matching the `/api/chat` request shape.
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub tool_name: String,
    pub tool_args: Option<Value>,
    pub result: Value,
}

/// The full per-turn request: a user message, optionally accompanied by
/// tool results from a prior `TOOL_CALL`.
#[derive(Debug, Clone, Default)]
pub struct TurnInput {
    pub user_message: String,
    pub tool_results: Vec<ToolResult>,
}

impl TurnInput {
    pub fn message(user_message: impl Into<String>) -> Self {
        Self { user_message: user_message.into(), tool_results: Vec::new() }
    }

    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        Self { user_message: String::new(), tool_results: results }
    }
}
