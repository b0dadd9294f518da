//! POST /api/sessions/reset — drop a conversation's state so a fresh turn
//! starts the form over.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use formpilot_core::FormPilotError;
use formpilot_sessions::SessionError;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::http::error::{ApiError, ValidatedJson};

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub conversation_id: String,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub success: bool,
    pub message: String,
}

pub async fn reset_session(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ResetRequest>,
) -> Result<Json<ResetResponse>, ApiError> {
    state.sessions.delete(&req.conversation_id).map_err(|e| match e {
        SessionError::NotFound { id } => FormPilotError::SessionNotFound { id },
        SessionError::AlreadyExists { id } => FormPilotError::Internal(format!("unexpected AlreadyExists on delete: {id}")),
    })?;

    Ok(Json(ResetResponse { success: true, message: "session reset".to_string() }))
}
