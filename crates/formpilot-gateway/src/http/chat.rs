//! POST /api/chat — the sole entry point into the turn orchestrator.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use formpilot_core::{Action, FormPilotError};
use formpilot_orchestrator::{guards, TurnDeps, TurnInput};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::AppState;
use crate::http::error::{ApiError, ValidatedJson};

#[derive(Debug, Deserialize)]
pub struct ToolResultWire {
    pub tool_name: String,
    #[serde(default)]
    pub tool_args: Option<Value>,
    pub result: Value,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub form_context_md: String,
    #[serde(default)]
    pub user_message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub tool_results: Option<Vec<ToolResultWire>>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub action: Action,
    pub conversation_id: String,
    pub answers: HashMap<String, Value>,
}

pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if req.form_context_md.trim().is_empty() {
        return Err(FormPilotError::MalformedRequest("form_context_md must not be empty".to_string()).into());
    }

    let handle = match &req.conversation_id {
        Some(id) => state.sessions.get_or_create(id, || req.form_context_md.clone()),
        None => state
            .sessions
            .create(req.form_context_md.clone(), None)
            .map_err(|e| FormPilotError::Internal(e.to_string()))?,
    };

    let mut session = handle.lock().await;

    let parsed = formpilot_forms::parse_form(&session.form_context_md);
    let active_guards = guards::default_guards();
    let deps = TurnDeps { llm: state.llm.as_ref(), field_tools: &parsed.field_tools, guards: &active_guards };

    let tool_results = req
        .tool_results
        .unwrap_or_default()
        .into_iter()
        .map(|t| formpilot_orchestrator::ToolResult { tool_name: t.tool_name, tool_args: t.tool_args, result: t.result })
        .collect();

    let input = TurnInput { user_message: req.user_message, tool_results };
    let action = formpilot_orchestrator::run_turn(&mut session, input, &deps).await;

    Ok(Json(ChatResponse { action, conversation_id: session.id.clone(), answers: session.answers.clone() }))
}
