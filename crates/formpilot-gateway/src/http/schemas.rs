//! GET /api/schemas, GET /api/schemas/{filename} — browse the form
//! definitions available on disk under `schemas_dir`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use formpilot_core::FormPilotError;
use serde::Serialize;

use crate::app::AppState;
use crate::http::error::ApiError;

#[derive(Debug, Serialize)]
pub struct SchemaSummary {
    pub filename: String,
    pub title: String,
    pub size: u64,
}

#[derive(Debug, Serialize)]
pub struct SchemaListResponse {
    pub schemas: Vec<SchemaSummary>,
}

pub async fn list_schemas(State(state): State<Arc<AppState>>) -> Result<Json<SchemaListResponse>, ApiError> {
    let mut schemas = Vec::new();
    let mut entries = match tokio::fs::read_dir(&state.config.schemas_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Json(SchemaListResponse { schemas })),
        Err(e) => return Err(FormPilotError::Io(e).into()),
    };

    while let Some(entry) = entries.next_entry().await.map_err(FormPilotError::Io)? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let Some(filename) = path.file_name().and_then(|n| n.to_str()) else { continue };
        let content = tokio::fs::read_to_string(&path).await.map_err(FormPilotError::Io)?;
        let metadata = entry.metadata().await.map_err(FormPilotError::Io)?;
        let title = formpilot_forms::parse_form(&content).title;
        schemas.push(SchemaSummary { filename: filename.to_string(), title, size: metadata.len() });
    }

    schemas.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(Json(SchemaListResponse { schemas }))
}

#[derive(Debug, Serialize)]
pub struct SchemaContentResponse {
    pub filename: String,
    pub content: String,
}

pub async fn get_schema(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<SchemaContentResponse>, ApiError> {
    if filename.contains('/') || filename.contains("..") {
        return Err(FormPilotError::MalformedRequest("invalid schema filename".to_string()).into());
    }

    let path = std::path::Path::new(&state.config.schemas_dir).join(&filename);
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|_| FormPilotError::SchemaNotFound { filename: filename.clone() })?;

    Ok(Json(SchemaContentResponse { filename, content }))
}
